// Printable cellar export. The document is plain HTML styled for print, so the
// browser's print dialog produces the PDF.

pub mod handlers;

use std::fmt::Write;

use aws_sdk_s3::{primitives::ByteStream, Client as S3Client};
use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::inventory::stats::CellarStats;
use crate::inventory::window::current_status;
use crate::models::wine::WineRow;
use crate::text::escape_html;

const STYLE: &str = "body{font-family:Georgia,serif;margin:2rem;color:#222}\
h1{color:#722f37}table{width:100%;border-collapse:collapse;font-size:12px}\
th,td{border-bottom:1px solid #ddd;padding:4px 6px;text-align:left}\
th{background:#f6f0f0}.summary span{margin-right:1.5rem}\
@media print{body{margin:0}}";

pub fn export_key(user_id: Uuid, generated_at: DateTime<Utc>) -> String {
    format!(
        "exports/{user_id}/{}.html",
        generated_at.format("%Y%m%dT%H%M%SZ")
    )
}

fn window_cell(wine: &WineRow, today: NaiveDate) -> String {
    match wine.window() {
        Some(w) => format!(
            "{} ({} to {})",
            current_status(w, today).label(),
            w.earliest_date,
            w.latest_date
        ),
        None => "unknown".to_string(),
    }
}

fn optional(value: Option<&str>) -> String {
    value.map(escape_html).unwrap_or_default()
}

/// Renders the cellar as a standalone HTML page. Wines are grouped by type,
/// then ordered by producer and vintage.
pub fn render_cellar_html(
    wines: &[WineRow],
    stats: &CellarStats,
    generated_at: DateTime<Utc>,
) -> String {
    let today = generated_at.date_naive();
    let mut sorted: Vec<&WineRow> = wines.iter().filter(|w| w.quantity > 0).collect();
    sorted.sort_by(|a, b| {
        a.wine_type
            .cmp(&b.wine_type)
            .then_with(|| a.producer.cmp(&b.producer))
            .then_with(|| a.vintage.cmp(&b.vintage))
    });

    let mut html = String::new();
    // Writing into a String cannot fail.
    let _ = write!(
        html,
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Cellar export</title>\
<style>{STYLE}</style></head><body><h1>My cellar</h1>\
<p>Generated {}</p><div class=\"summary\">\
<span>{} bottles</span><span>{} wines</span><span>Value {:.2}</span>\
<span>{} ready to drink</span><span>{} over the hill</span></div>",
        generated_at.format("%Y-%m-%d %H:%M UTC"),
        stats.total_bottles,
        stats.distinct_wines,
        stats.total_value,
        stats.ready_to_drink,
        stats.over_hill,
    );

    if sorted.is_empty() {
        html.push_str("<p>No bottles in stock.</p></body></html>");
        return html;
    }

    html.push_str(
        "<table><thead><tr><th>Type</th><th>Wine</th><th>Region</th><th>Varietal</th>\
<th>Qty</th><th>Drinking window</th><th>Location</th><th>Price</th></tr></thead><tbody>",
    );
    for wine in sorted {
        let region = match (wine.region.as_deref(), wine.country.as_deref()) {
            (Some(r), Some(c)) => escape_html(&format!("{r}, {c}")),
            (r, c) => optional(r.or(c)),
        };
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&wine.wine_type),
            escape_html(&wine.display_name()),
            region,
            escape_html(&wine.varietal.join(", ")),
            wine.quantity,
            window_cell(wine, today),
            optional(wine.storage_location.as_deref()),
            wine.purchase_price
                .map(|p| format!("{p:.2}"))
                .unwrap_or_default(),
        );
    }
    html.push_str("</tbody></table></body></html>");
    html
}

/// Stores the rendered export and returns its object key.
pub async fn upload_export(
    s3: &S3Client,
    bucket: &str,
    user_id: Uuid,
    generated_at: DateTime<Utc>,
    html: &str,
) -> Result<String, AppError> {
    let key = export_key(user_id, generated_at);
    s3.put_object()
        .bucket(bucket)
        .key(&key)
        .body(ByteStream::from(Bytes::copy_from_slice(html.as_bytes())))
        .content_type("text/html; charset=utf-8")
        .send()
        .await
        .map_err(|e| AppError::S3(format!("Export upload failed: {e}")))?;
    info!("Uploaded cellar export to s3://{bucket}/{key}");
    Ok(key)
}
