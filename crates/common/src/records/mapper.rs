//! Row <-> record translation.
//!
//! Both directions are total: nothing here fails. A column the sheet lacks
//! becomes an empty string, and a column the whitelist does not name is
//! dropped.

use super::columns::{self, Alias, BODY_TEXT_ALIAS, COVER_TEXT_ALIAS};
use super::Record;
use crate::sheets::{RawRow, RowValues};

/// Value of an aliased field: the primary column when it holds anything,
/// otherwise the legacy column.
pub fn resolve_alias(values: &RowValues, alias: Alias) -> String {
    match values.get(alias.primary) {
        Some(primary) if !primary.is_empty() => primary.clone(),
        _ => cell(values, alias.legacy),
    }
}

/// Project a raw row onto the record whitelist
pub fn row_to_record(row: &RawRow) -> Record {
    let values = &row.values;

    Record {
        serial: cell(values, columns::SERIAL),
        brand_name: cell(values, columns::BRAND_NAME),
        brand_logo: cell(values, columns::BRAND_LOGO),
        slug: cell(values, columns::SLUG),
        founder_name: cell(values, columns::FOUNDER_NAME),
        founder_image: cell(values, columns::FOUNDER_IMAGE),
        old_mrr: cell(values, columns::OLD_MRR),
        timeline: cell(values, columns::TIMELINE),
        new_mrr: cell(values, columns::NEW_MRR),
        cover_image: cell(values, columns::COVER_IMAGE),
        cover_text: resolve_alias(values, COVER_TEXT_ALIAS),
        body_text: resolve_alias(values, BODY_TEXT_ALIAS),
        custom_cta: cell(values, columns::CUSTOM_CTA),
        seo_meta: cell(values, columns::SEO_META),
        category_tags: cell(values, columns::CATEGORY_TAGS),
        tags: string_to_tags(values.get(columns::TAGS).map(String::as_str)),
        row_index: row.row_index,
    }
}

/// Flatten a record into sheet columns.
///
/// Always emits every canonical column, empty or not, and never a legacy
/// alias name. `row_index` is not written.
pub fn record_to_row(record: &Record) -> RowValues {
    let pairs = [
        (columns::SERIAL, record.serial.clone()),
        (columns::BRAND_NAME, record.brand_name.clone()),
        (columns::BRAND_LOGO, record.brand_logo.clone()),
        (columns::SLUG, record.slug.clone()),
        (columns::FOUNDER_NAME, record.founder_name.clone()),
        (columns::FOUNDER_IMAGE, record.founder_image.clone()),
        (columns::OLD_MRR, record.old_mrr.clone()),
        (columns::TIMELINE, record.timeline.clone()),
        (columns::NEW_MRR, record.new_mrr.clone()),
        (columns::COVER_IMAGE, record.cover_image.clone()),
        (COVER_TEXT_ALIAS.primary, record.cover_text.clone()),
        (BODY_TEXT_ALIAS.primary, record.body_text.clone()),
        (columns::CUSTOM_CTA, record.custom_cta.clone()),
        (columns::SEO_META, record.seo_meta.clone()),
        (columns::CATEGORY_TAGS, record.category_tags.clone()),
        (columns::TAGS, tags_to_string(&record.tags)),
    ];

    pairs
        .into_iter()
        .map(|(column, value)| (column.to_string(), value))
        .collect()
}

/// Split the stored comma-joined tag string.
///
/// Missing and empty input give an empty list, never `[""]`. Tags are not
/// trimmed so joining them back reproduces the stored text.
pub fn string_to_tags(joined: Option<&str>) -> Vec<String> {
    match joined {
        None | Some("") => Vec::new(),
        Some(joined) => joined.split(',').map(str::to_string).collect(),
    }
}

/// Join tags for storage
pub fn tags_to_string(tags: &[String]) -> String {
    tags.join(",")
}

/// Rows with a blank brand name are placeholders, not data
pub fn is_placeholder(values: &RowValues) -> bool {
    values
        .get(columns::BRAND_NAME)
        .map_or(true, |name| name.trim().is_empty())
}

fn cell(values: &RowValues, column: &str) -> String {
    values.get(column).cloned().unwrap_or_default()
}
