//! Column names of the brand sheets.
//!
//! The header row of each sheet is the only schema the backing store has.
//! These constants are the whitelist the mapper projects through; any
//! header not listed here never reaches a [`Record`](super::Record).

/// Serial number, the natural key for update/delete
pub const SERIAL: &str = "s_no";
pub const BRAND_NAME: &str = "brand_name";
pub const BRAND_LOGO: &str = "brand_logo";
pub const SLUG: &str = "slug";
pub const FOUNDER_NAME: &str = "Founder_name";
pub const FOUNDER_IMAGE: &str = "Founder_image";
pub const OLD_MRR: &str = "OLD_MRR";
pub const TIMELINE: &str = "timeline";
pub const NEW_MRR: &str = "New_MRR";
pub const COVER_IMAGE: &str = "Cover_Image_link";
pub const CUSTOM_CTA: &str = "Custom_CTA";
pub const SEO_META: &str = "SEO_meta_data";
pub const CATEGORY_TAGS: &str = "Category_tags";
/// Free-form tags, comma-joined in the sheet
pub const TAGS: &str = "tag";

/// Current cover text column
pub const COVER_TEXT: &str = "Cover_text_1";
/// Cover text column used by older sheets
pub const COVER_TEXT_LEGACY: &str = "Cover_text";
/// Current body HTML column
pub const BODY_TEXT: &str = "body_text_1";
/// Body HTML column used by older sheets
pub const BODY_TEXT_LEGACY: &str = "body_text";

/// A logical field that two historical header names may back.
///
/// Reads prefer `primary` and fall back to `legacy`; writes only ever
/// touch `primary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alias {
    pub primary: &'static str,
    pub legacy: &'static str,
}

pub const COVER_TEXT_ALIAS: Alias = Alias {
    primary: COVER_TEXT,
    legacy: COVER_TEXT_LEGACY,
};

pub const BODY_TEXT_ALIAS: Alias = Alias {
    primary: BODY_TEXT,
    legacy: BODY_TEXT_LEGACY,
};

/// Every header written by the mapper, in the order records are emitted.
pub const CANONICAL: [&str; 16] = [
    SERIAL,
    BRAND_NAME,
    BRAND_LOGO,
    SLUG,
    FOUNDER_NAME,
    FOUNDER_IMAGE,
    OLD_MRR,
    TIMELINE,
    NEW_MRR,
    COVER_IMAGE,
    COVER_TEXT,
    BODY_TEXT,
    CUSTOM_CTA,
    SEO_META,
    CATEGORY_TAGS,
    TAGS,
];

/// Whether `header` is ever read by the mapper, legacy names included
pub fn is_recognized(header: &str) -> bool {
    CANONICAL.contains(&header) || header == COVER_TEXT_LEGACY || header == BODY_TEXT_LEGACY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_never_contains_legacy_names() {
        assert!(!CANONICAL.contains(&COVER_TEXT_LEGACY));
        assert!(!CANONICAL.contains(&BODY_TEXT_LEGACY));
    }

    #[test]
    fn test_recognized_headers() {
        assert!(is_recognized("s_no"));
        assert!(is_recognized("Cover_text"));
        assert!(is_recognized("body_text_1"));
        assert!(!is_recognized("internal_notes"));
        assert!(!is_recognized("rowIndex"));
    }
}
