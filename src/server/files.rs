//! Filesystem access: file contents, entry kinds and directory indexes.

use std::borrow::Cow;
use std::io;
use std::path::Path;

/// What a resolved path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file of the given size in bytes.
    File(u64),
    Directory,
    /// Sockets, FIFOs, devices: they exist but are never served.
    Other,
}

/// Look up what kind of entry lives at `path`, following symbolic links.
pub async fn entry_kind(path: &Path) -> io::Result<EntryKind> {
    let metadata = tokio::fs::metadata(path).await?;
    let kind = if metadata.is_file() {
        EntryKind::File(metadata.len())
    } else if metadata.is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::Other
    };
    Ok(kind)
}

/// Read a whole file into memory in one go.
pub async fn read_file(path: &Path) -> io::Result<Vec<u8>> {
    tokio::fs::read(path).await
}

/// Guess a MIME type from the file name, defaulting to `application/octet-stream`.
pub fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path).first_or_octet_stream().to_string()
}

/// The anchor lines for every direct child of `dir`, sorted by name and joined
/// with `\n`.
pub async fn list_directory(dir: &Path) -> io::Result<String> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();

    let anchors: Vec<String> = names
        .iter()
        .map(|name| {
            let name = escape_html(name);
            format!("<a href=\"{name}\">{name}</a>")
        })
        .collect();
    Ok(anchors.join("\n"))
}

/// Render the HTML index page for `dir`, titled with the request path.
pub async fn render_directory_index(dir: &Path, request_path: &str) -> io::Result<String> {
    let entries = list_directory(dir).await?;
    let title = escape_html(request_path);

    let mut page = format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head><title>Index of {title}</title></head>\n\
         <body>\n\
         <h1>Index of {title}</h1>\n\
         <hr>\n\
         <pre>\n\
         <a href=\"../\">../</a>\n"
    );
    if !entries.is_empty() {
        page.push_str(&entries);
        page.push('\n');
    }
    page.push_str("</pre>\n<hr>\n</body>\n</html>\n");
    Ok(page)
}

fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}
