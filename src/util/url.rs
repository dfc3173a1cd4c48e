/// Joins a path to an URL, ensuring that there is exactly one `/` between the
/// base and the appended segment.
pub fn join(url: &reqwest::Url, mut path: &str) -> reqwest::Url {
    let mut url = url.clone();
    while path.starts_with('/') {
        path = &path[1..]
    }
    // `Url::join` treats the last path segment of the base as a file unless it
    // ends in a slash, which would silently drop it.
    if !url.path().ends_with('/') {
        url.set_path(&format!("{}/", url.path()));
    }
    url.join(path).expect("URL path join to always succeed")
}
