//! Repair of double-encoded signed URLs
//!
//! The preview endpoint sometimes returns object keys whose slashes were
//! percent-encoded twice (`%252F` instead of `%2F`). Each pass strips one
//! layer of `%25` escaping; at most two passes, stopping as soon as no
//! `%252F` remains. Other escapes are left alone so the signature stays valid.

use tracing::debug;

const MAX_PASSES: usize = 2;

/// Undo double percent-encoding of `/` in a preview URL
pub fn repair_preview_url(url: &str) -> String {
    let mut repaired = url.to_string();

    for _ in 0..MAX_PASSES {
        if !contains_double_encoded_slash(&repaired) {
            break;
        }
        repaired = unescape_percent_layer(&repaired);
    }

    if repaired != url {
        debug!(original = %url, repaired = %repaired, "Repaired double-encoded preview URL");
    }

    repaired
}

fn contains_double_encoded_slash(url: &str) -> bool {
    url.to_ascii_uppercase().contains("%252F")
}

/// `%25` → `%`, one layer
fn unescape_percent_layer(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    let mut rest = url;

    while let Some(pos) = rest.find("%25") {
        out.push_str(&rest[..pos]);
        out.push('%');
        rest = &rest[pos + 3..];
    }
    out.push_str(rest);
    out
}
