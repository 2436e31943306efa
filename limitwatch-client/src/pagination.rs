use {
    crate::{model::Page, ClientError},
    log::trace,
    std::collections::HashSet,
};

/// Call `fetch` with each page token in turn, starting with none, until a page comes back without a next-page token.
/// Returns the concatenated items of every page. A token that comes back a second time is an error.
pub fn list_all<T, F>(mut fetch: F) -> Result<Vec<T>, ClientError>
where
    F: FnMut(Option<&str>) -> Result<Page<T>, ClientError>,
{
    let mut items = Vec::new();
    let mut token: Option<String> = None;
    let mut seen: HashSet<String> = HashSet::new();

    loop {
        let page = fetch(token.as_deref())?;
        items.extend(page.items);

        match page.next_page {
            Some(next) if !next.is_empty() => {
                if !seen.insert(next.clone()) {
                    return Err(ClientError::InvalidResponse(format!("page token {next} repeated")));
                }
                trace!("Following page token {}", next);
                token = Some(next);
            }
            _ => return Ok(items),
        }
    }
}
