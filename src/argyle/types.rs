use serde::Deserialize;

/// One page of a cursor-paginated Argyle listing. `next` holds the absolute
/// URL of the following page, or nothing on the last page.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
}
