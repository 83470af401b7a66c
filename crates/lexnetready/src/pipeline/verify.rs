use std::sync::LazyLock;

use regex::Regex;

use crate::batch::SignatureDetails;

static RE_COMMON_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Signer Certificate Common Name:[ \t]*([^\r\n]+)").unwrap());
static RE_SIGNING_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Signing Time:[ \t]*([^\r\n]+)").unwrap());

/// Pulls the first signer name and signing time out of a `pdfsig` report.
/// Either field may be absent; parsing never fails.
pub fn parse_signature_report(report: &str) -> SignatureDetails {
    SignatureDetails {
        common_name: first_capture(&RE_COMMON_NAME, report),
        signing_time: first_capture(&RE_SIGNING_TIME, report),
    }
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}
