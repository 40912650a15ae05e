//! Form extraction for multipart and urlencoded submissions.

use crate::form::{FormData, UploadedFile};
use crate::store::tasks::TaskForm;
use axum::extract::{Form, FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};

/// Request body read fully into a [`FormData`].
///
/// Multipart bodies keep their files; anything else is parsed as
/// `application/x-www-form-urlencoded`.
pub struct Submitted(pub FormData);

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

impl<S> FromRequest<S> for Submitted
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut form = FormData::new();

        if !is_multipart(&req) {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            for (name, value) in pairs {
                form.push_field(name, value);
            }
            return Ok(Submitted(form));
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(IntoResponse::into_response)?
        {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            match file_name {
                Some(file_name) => {
                    let bytes = field.bytes().await.map_err(IntoResponse::into_response)?;
                    form.push_file(UploadedFile {
                        field: name,
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
                None => {
                    let value = field.text().await.map_err(IntoResponse::into_response)?;
                    form.push_field(name, value);
                }
            }
        }

        Ok(Submitted(form))
    }
}

/// Add/edit form fields out of a submission.
pub fn task_form(form: &FormData) -> TaskForm {
    TaskForm {
        project_id: form.get_owned("project_id"),
        title: form.get_owned("title"),
        category: form.get_owned("category"),
        workshop: form.get_owned("workshop"),
        description: form.get_owned("description"),
        pain_points: form.get_owned("pain_points"),
        process: form.get_owned("process"),
        results: form.get_owned("results"),
        progress: form.get_owned("progress"),
    }
}
