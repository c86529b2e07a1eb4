use super::get::find_certificate;
use crate::error::LookupError;
use crate::state::AppState;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use certs_common::model::certificate::Certificate;
use chrono::NaiveDate;
use genpdf::elements::{Break, Paragraph};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::{Style, StyledString};
use genpdf::{Document, SimplePageDecorator, Size};
use log::warn;

const TITLE: &str = "Certificate of Internship";
const TITLE_FONT_SIZE: u8 = 28;
const BODY_FONT_SIZE: u8 = 16;
/// Landscape A4, in millimetres.
const PAGE_WIDTH_MM: f64 = 297.0;
const PAGE_HEIGHT_MM: f64 = 210.0;
const MARGIN_MM: i32 = 25;
const FALLBACK_FONT_FAMILY: &str = "LiberationSans";

/// Actix web handler for `GET /api/certificates/{certificate_id}/pdf`.
pub async fn process(
    certificate_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, LookupError> {
    let certificate = find_certificate(&state, certificate_id.into_inner())
        .await?
        .ok_or(LookupError::NotFound)?;

    let filename = format!("{}.pdf", certificate.certificate_id);
    let config = state.config.clone();
    let bytes = web::block(move || {
        render_certificate(&certificate, &config.fonts_dir, &config.font_family)
    })
    .await
    .map_err(|e| LookupError::Worker(e.to_string()))?
    .map_err(LookupError::Render)?;

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename)],
        })
        .body(bytes))
}

/// Formats a date the way the certificate prints it, e.g. `Mon Jan 15 2024`.
fn display_date(date: NaiveDate) -> String {
    date.format("%a %b %d %Y").to_string()
}

/// The lines printed under the title, one per field.
fn certificate_lines(certificate: &Certificate) -> Vec<String> {
    vec![
        format!("Certificate ID: {}", certificate.certificate_id),
        format!("Student: {}", certificate.student_name),
        format!("Domain: {}", certificate.domain),
        format!(
            "Internship: {} - {}",
            display_date(certificate.internship_start),
            display_date(certificate.internship_end)
        ),
        format!("Issued: {}", display_date(certificate.issue_date)),
    ]
}

/// Load the configured font family, falling back to LiberationSans from the
/// same directory.
fn load_font(fonts_dir: &str, family: &str) -> Result<FontFamily<FontData>, genpdf::error::Error> {
    match genpdf::fonts::from_files(fonts_dir, family, None) {
        Ok(fonts) => Ok(fonts),
        Err(e) if family != FALLBACK_FONT_FAMILY => {
            warn!("Font family '{}' unavailable ({}), using {}", family, e, FALLBACK_FONT_FAMILY);
            genpdf::fonts::from_files(fonts_dir, FALLBACK_FONT_FAMILY, None)
        }
        Err(e) => Err(e),
    }
}

/// Configure and return a genpdf Document with page size, font and margins set.
fn configure_document(
    fonts_dir: &str,
    family: &str,
    title: &str,
) -> Result<Document, genpdf::error::Error> {
    let mut doc = Document::new(load_font(fonts_dir, family)?);
    doc.set_title(title);
    doc.set_paper_size(Size::new(PAGE_WIDTH_MM, PAGE_HEIGHT_MM));
    doc.set_font_size(BODY_FONT_SIZE);
    doc.set_line_spacing(1.25f64);

    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(MARGIN_MM);
    doc.set_page_decorator(decorator);
    Ok(doc)
}

/// Renders a certificate into PDF bytes: the title line, then one line per
/// field.
fn render_certificate(
    certificate: &Certificate,
    fonts_dir: &str,
    font_family: &str,
) -> Result<Vec<u8>, String> {
    let mut doc = configure_document(
        fonts_dir,
        font_family,
        &format!("{} {}", TITLE, certificate.certificate_id),
    )
    .map_err(|e| e.to_string())?;

    doc.push(Paragraph::new(StyledString::new(
        TITLE,
        Style::new().bold().with_font_size(TITLE_FONT_SIZE),
    )));
    doc.push(Break::new(2));
    for line in certificate_lines(certificate) {
        doc.push(Paragraph::new(line));
        doc.push(Break::new(0.5));
    }

    let mut bytes = Vec::new();
    doc.render(&mut bytes).map_err(|e| e.to_string())?;
    Ok(bytes)
}
