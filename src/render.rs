//! Renders arranged galleries to HTML. The arranger decides spans and rows;
//! this module turns those decisions into template values and executes the
//! theme's grid template over them.
//!
//! The template sees a single object:
//!
//! * `title`, `description`, `date` (formatted, or nil), `cover_image` (an
//!   image URL, or nil), `site` (the prettified home page), `home_page`, and
//!   `columns` (always 6)
//! * `rows`: an array of `{ row, items }`, where each item carries `id`,
//!   `src`, `width`, `height`, `aspect_ratio`, `orientation`, `col_span`,
//!   and `row_start`
//!
//! A minimal template for a Tailwind-style grid might look like:
//!
//! ```html
//! <div class="grid grid-cols-{{.columns}}">
//! {{range .rows}}{{range .items}}
//!   <img class="col-span-{{.col_span}} row-start-{{.row_start}}" src="{{.src}}">
//! {{end}}{{end}}
//! </div>
//! ```

use crate::date;
use crate::gallery::Gallery;
use crate::grid::{rows, Row, GRID_COLUMNS};
use crate::photo::PlacedImage;
use crate::text::prettify_url;
use gtmpl::Template;
use gtmpl_value::Value;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use url::Url;

/// Responsible for templating arranged galleries and writing them to disk.
pub struct Renderer<'a> {
    /// The template for gallery pages.
    pub template: &'a Template,

    /// The URL for the site's home page. This is made available to the
    /// template, typically as the destination for the site-header link.
    pub home_page: &'a Url,

    /// The URL images are served from. Should end in a slash.
    pub image_base_url: &'a Url,

    /// The named image size, e.g. `small`.
    pub image_variant: &'a str,

    /// The directory gallery pages are written to.
    pub output_directory: &'a Path,
}

impl Renderer<'_> {
    /// The delivery URL of an image: `{image_base_url}{id}/{variant}`. The id
    /// and variant are each pushed as a single percent-encoded path segment.
    pub fn image_url(&self, id: &str) -> Result<Url> {
        let mut url = self.image_base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::ImageBaseUrl(self.image_base_url.clone()))?
            .pop_if_empty()
            .push(id)
            .push(self.image_variant);
        Ok(url)
    }

    /// Converts a gallery and its arrangement into the template value
    /// described in the module docs.
    pub fn page_value(&self, gallery: &Gallery, placed: &[PlacedImage]) -> Result<Value> {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("title".to_owned(), (&gallery.title).into());
        m.insert("description".to_owned(), option_to_value(&gallery.description));
        m.insert(
            "cover_image".to_owned(),
            match &gallery.cover_image {
                Some(id) => Value::String(self.image_url(id)?.to_string()),
                None => Value::Nil,
            },
        );
        m.insert(
            "date".to_owned(),
            match &gallery.date {
                Some(d) => Value::String(date::format_long(date::parse_any(d)?)),
                None => Value::Nil,
            },
        );
        m.insert(
            "site".to_owned(),
            Value::String(prettify_url(self.home_page.as_str())),
        );
        m.insert(
            "home_page".to_owned(),
            Value::String(self.home_page.to_string()),
        );
        m.insert("columns".to_owned(), Value::from(GRID_COLUMNS as u64));
        m.insert(
            "rows".to_owned(),
            Value::Array(
                rows(placed)
                    .map(|row| self.row_value(row))
                    .collect::<Result<Vec<Value>>>()?,
            ),
        );
        Ok(Value::Object(m))
    }

    fn row_value(&self, row: Row) -> Result<Value> {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("row".to_owned(), Value::from(row.number as u64));
        m.insert(
            "items".to_owned(),
            Value::Array(
                row.images
                    .iter()
                    .map(|p| self.item_value(p))
                    .collect::<Result<Vec<Value>>>()?,
            ),
        );
        Ok(Value::Object(m))
    }

    fn item_value(&self, placed: &PlacedImage) -> Result<Value> {
        let image = &placed.image;
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("id".to_owned(), (&image.id).into());
        m.insert(
            "src".to_owned(),
            Value::String(self.image_url(&image.id)?.to_string()),
        );
        m.insert("width".to_owned(), Value::from(image.width as u64));
        m.insert("height".to_owned(), Value::from(image.height as u64));
        m.insert("aspect_ratio".to_owned(), Value::from(image.aspect_ratio));
        m.insert(
            "orientation".to_owned(),
            Value::String(placed.orientation().to_string()),
        );
        m.insert("col_span".to_owned(), Value::from(placed.col_span as u64));
        m.insert("row_start".to_owned(), Value::from(placed.row_start as u64));
        Ok(Value::Object(m))
    }

    /// Templates a gallery page into `w`.
    pub fn render_page<W: Write>(
        &self,
        gallery: &Gallery,
        placed: &[PlacedImage],
        w: &mut W,
    ) -> Result<()> {
        let context = gtmpl::Context::from(self.page_value(gallery, placed)?)
            .map_err(|e| Error::Template(e.to_string()))?;
        self.template
            .execute(w, &context)
            .map_err(|e| Error::Template(e.to_string()))?;
        Ok(())
    }

    /// Templates a gallery page and writes it to
    /// `{output_directory}/{slug}.html`, where the slug comes from the
    /// gallery title. Returns the path written. Nothing is written unless
    /// templating succeeds.
    pub fn write_page(&self, gallery: &Gallery, placed: &[PlacedImage]) -> Result<PathBuf> {
        let mut page = Vec::new();
        self.render_page(gallery, placed, &mut page)?;

        std::fs::create_dir_all(self.output_directory)?;
        let file_path = self.output_directory.join(page_file_name(&gallery.title));
        std::fs::write(&file_path, page)?;
        tracing::info!(
            title = %gallery.title,
            images = placed.len(),
            path = %file_path.display(),
            "wrote gallery page"
        );
        Ok(file_path)
    }
}

fn option_to_value(opt: &Option<String>) -> Value {
    match opt {
        Some(s) => s.into(),
        None => Value::Nil,
    }
}

/// The output file name for a gallery titled `title`.
pub fn page_file_name(title: &str) -> String {
    let slug = slug::slugify(title);
    match slug.is_empty() {
        true => String::from("gallery.html"),
        false => format!("{}.html", slug),
    }
}

/// Loads the template file contents, concatenates them, and parses the
/// result into a template.
pub fn parse_template<P: AsRef<Path>>(template_files: impl Iterator<Item = P>) -> Result<Template> {
    let mut contents = String::new();
    for template_file in template_files {
        use std::io::Read;
        let template_file = template_file.as_ref();
        File::open(template_file)
            .map_err(|e| Error::OpenTemplateFile {
                path: template_file.to_owned(),
                err: e,
            })?
            .read_to_string(&mut contents)?;
        contents.push(' ');
    }
    parse_template_str(&contents)
}

pub fn parse_template_str(contents: &str) -> Result<Template> {
    let mut template = Template::default();
    template
        .parse(contents)
        .map_err(|e| Error::ParseTemplate(e.to_string()))?;
    Ok(template)
}

/// The result of a fallible rendering operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error rendering a gallery page.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// An error during templating.
    Template(String),

    /// Returned when the image base URL can't have path segments appended,
    /// e.g. `mailto:` or `data:` URLs.
    ImageBaseUrl(Url),

    /// Returned when a gallery's date can't be parsed.
    Date(date::Error),

    /// An error writing the output files.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate(err) => write!(f, "Parsing template: {}", err),
            Error::Template(err) => err.fmt(f),
            Error::ImageBaseUrl(url) => {
                write!(f, "Image base URL '{}' cannot have paths appended", url)
            }
            Error::Date(err) => write!(f, "Gallery date: {}", err),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) | Error::Template(_) | Error::ImageBaseUrl(_) => None,
            Error::Date(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts an [`std::io::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator for fallible I/O operations.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<date::Error> for Error {
    /// Converts a [`date::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator when formatting gallery dates.
    fn from(err: date::Error) -> Error {
        Error::Date(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::arrange;
    use crate::photo::Image;

    const TEMPLATE: &str = "{{.title}}|{{if .date}}{{.date}}{{end}}|{{.site}}\
        {{range .rows}}\n{{.row}}:{{range .items}} {{.id}}={{.col_span}}@{{.row_start}}{{end}}{{end}}";

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn gallery(date: Option<&str>) -> Gallery {
        Gallery {
            title: "Lisbon, Spring!".to_owned(),
            date: date.map(str::to_owned),
            description: None,
            cover_image: None,
            photos: Vec::new(),
        }
    }

    fn placed() -> Vec<PlacedImage> {
        arrange(vec![
            Image::from_dimensions("a", 800, 1200).unwrap(),
            Image::from_dimensions("b", 1200, 800).unwrap(),
            Image::from_dimensions("c", 1200, 800).unwrap(),
        ])
    }

    fn fixture<'a>(
        template: &'a Template,
        home_page: &'a Url,
        image_base_url: &'a Url,
        output_directory: &'a Path,
    ) -> Renderer<'a> {
        Renderer {
            template,
            home_page,
            image_base_url,
            image_variant: "small",
            output_directory,
        }
    }

    #[test]
    fn test_render_page() -> Result<()> {
        let template = parse_template_str(TEMPLATE)?;
        let home_page = url("https://www.example.org/");
        let images = url("https://img.example.org/hash/");
        let renderer = fixture(&template, &home_page, &images, Path::new("unused"));

        let mut out = Vec::new();
        renderer.render_page(&gallery(Some("2024/123")), &placed(), &mut out)?;
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Lisbon, Spring!|2 May 2024|example.org\n1: a=2@1 b=4@1\n2: c=6@2"
        );
        Ok(())
    }

    #[test]
    fn test_undated_gallery() -> Result<()> {
        let template = parse_template_str("[{{if .date}}dated{{end}}]")?;
        let home_page = url("https://example.org/");
        let renderer = fixture(&template, &home_page, &home_page, Path::new("unused"));

        let mut out = Vec::new();
        renderer.render_page(&gallery(None), &[], &mut out)?;
        assert_eq!(String::from_utf8(out).unwrap(), "[]");
        Ok(())
    }

    #[test]
    fn test_bad_date_is_an_error() -> Result<()> {
        let template = parse_template_str("{{.title}}")?;
        let home_page = url("https://example.org/");
        let renderer = fixture(&template, &home_page, &home_page, Path::new("unused"));
        let result = renderer.render_page(&gallery(Some("last tuesday")), &[], &mut Vec::new());
        assert!(matches!(result, Err(Error::Date(_))));
        Ok(())
    }

    #[test]
    fn test_image_url() -> Result<()> {
        let template = parse_template_str("-")?;
        let home_page = url("https://example.org/");
        let images = url("https://imagedelivery.example/account/");
        let renderer = fixture(&template, &home_page, &images, Path::new("unused"));
        assert_eq!(
            renderer.image_url("tram-28")?.as_str(),
            "https://imagedelivery.example/account/tram-28/small"
        );
        Ok(())
    }

    #[test]
    fn test_image_url_keeps_ids_in_one_segment() -> Result<()> {
        let template = parse_template_str("-")?;
        let home_page = url("https://example.org/");
        let images = url("https://img.example.org/account/");
        let renderer = fixture(&template, &home_page, &images, Path::new("unused"));
        assert_eq!(
            renderer.image_url("/x")?.as_str(),
            "https://img.example.org/account/%2Fx/small"
        );
        assert_eq!(
            renderer.image_url("2024/123")?.as_str(),
            "https://img.example.org/account/2024%2F123/small"
        );
        assert_eq!(
            renderer.image_url("a:b")?.as_str(),
            "https://img.example.org/account/a:b/small"
        );
        assert_eq!(
            renderer.image_url("a?b#c")?.as_str(),
            "https://img.example.org/account/a%3Fb%23c/small"
        );
        Ok(())
    }

    #[test]
    fn test_image_url_needs_a_hierarchical_base() -> Result<()> {
        let template = parse_template_str("-")?;
        let home_page = url("https://example.org/");
        let images = url("mailto:photos@example.org");
        let renderer = fixture(&template, &home_page, &images, Path::new("unused"));
        assert!(matches!(
            renderer.image_url("tram-28"),
            Err(Error::ImageBaseUrl(_))
        ));
        Ok(())
    }

    #[test]
    fn test_cover_image() -> Result<()> {
        let template = parse_template_str("[{{if .cover_image}}{{.cover_image}}{{end}}]")?;
        let home_page = url("https://example.org/");
        let images = url("https://img.example.org/");
        let renderer = fixture(&template, &home_page, &images, Path::new("unused"));

        let mut covered = gallery(None);
        covered.cover_image = Some("tram-28".to_owned());
        let mut out = Vec::new();
        renderer.render_page(&covered, &[], &mut out)?;
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "[https://img.example.org/tram-28/small]"
        );

        let mut out = Vec::new();
        renderer.render_page(&gallery(None), &[], &mut out)?;
        assert_eq!(String::from_utf8(out).unwrap(), "[]");
        Ok(())
    }

    #[test]
    fn test_failed_page_leaves_no_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let output = dir.path().join("site");
        let template = parse_template_str("{{.title}}")?;
        let home_page = url("https://example.org/");
        let renderer = fixture(&template, &home_page, &home_page, &output);

        let result = renderer.write_page(&gallery(Some("last tuesday")), &placed());
        assert!(matches!(result, Err(Error::Date(_))));
        assert!(!output.join("lisbon-spring.html").exists());
        Ok(())
    }

    #[test]
    fn test_write_page() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let output = dir.path().join("site");
        let template = parse_template_str(
            "{{range .rows}}{{range .items}}<img class=\"col-span-{{.col_span}}\" src=\"{{.src}}\">{{end}}{{end}}",
        )?;
        let home_page = url("https://example.org/");
        let images = url("https://img.example.org/");
        let renderer = fixture(&template, &home_page, &images, &output);

        let path = renderer.write_page(&gallery(None), &placed())?;
        assert_eq!(path, output.join("lisbon-spring.html"));
        let html = std::fs::read_to_string(path)?;
        assert!(html.contains(r#"<img class="col-span-2" src="https://img.example.org/a/small">"#));
        assert!(html.contains(r#"<img class="col-span-6" src="https://img.example.org/c/small">"#));
        Ok(())
    }

    #[test]
    fn test_parse_template_missing_file() {
        let result = parse_template(std::iter::once(Path::new("/no/such/template.html")));
        assert!(matches!(result, Err(Error::OpenTemplateFile { .. })));
    }

    #[test]
    fn test_page_file_name() {
        assert_eq!(page_file_name("Lisbon, Spring!"), "lisbon-spring.html");
        assert_eq!(page_file_name("!!!"), "gallery.html");
    }
}
