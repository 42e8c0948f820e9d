//! Small string helpers for presenting URLs.

/// Makes a URL as short as possible for display. In order, this removes the
/// first `http://` or `https://`, the first `www.`, one trailing slash,
/// everything from the first `?`, and everything from the first `#`.
///
/// The steps run in exactly that order, so `example.com/a/?q=1` keeps its
/// slash: it isn't trailing until the query is gone.
pub fn prettify_url(url: &str) -> String {
    let url = remove_first_scheme(url);
    let url = url.replacen("www.", "", 1);
    let url = url.strip_suffix('/').unwrap_or(&url);
    let url = url.split('?').next().unwrap_or(url);
    let url = url.split('#').next().unwrap_or(url);
    url.to_owned()
}

fn remove_first_scheme(url: &str) -> String {
    let http = url.find("http://");
    let https = url.find("https://");
    let found = match (http, https) {
        (Some(h), Some(s)) if s < h => Some((s, "https://".len())),
        (Some(h), _) => Some((h, "http://".len())),
        (None, Some(s)) => Some((s, "https://".len())),
        (None, None) => None,
    };
    match found {
        Some((start, len)) => format!("{}{}", &url[..start], &url[start + len..]),
        None => url.to_owned(),
    }
}
