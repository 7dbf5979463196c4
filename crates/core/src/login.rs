// crates/core/src/login.rs

/// Claims-provider prefixes SharePoint puts in front of login names.
const CLAIMS_PREFIXES: [&str; 3] = ["i:0#.w|", "i:0#.f|membership|", "i:05.t|"];

/// Strip one claims prefix from a SharePoint login name.
///
/// `i:0#.w|domein\jansen` becomes `domein\jansen`. Without a known prefix a
/// single leading `|` is removed; anything else is returned as is.
pub fn normalize_login_name(login_name: &str) -> String {
    for prefix in CLAIMS_PREFIXES {
        if let Some(head) = login_name.get(..prefix.len()) {
            if head.eq_ignore_ascii_case(prefix) {
                return login_name[prefix.len()..].to_string();
            }
        }
    }

    login_name
        .strip_prefix('|')
        .unwrap_or(login_name)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_windows_claim() {
        assert_eq!(normalize_login_name("i:0#.w|org\\jdevries"), "org\\jdevries");
    }

    #[test]
    fn strips_forms_claim_case_insensitive() {
        assert_eq!(
            normalize_login_name("I:0#.F|Membership|j.devries@org.nl"),
            "j.devries@org.nl"
        );
    }

    #[test]
    fn strips_trusted_claim() {
        assert_eq!(normalize_login_name("i:05.t|adfs|jdevries"), "adfs|jdevries");
    }

    #[test]
    fn strips_only_one_prefix() {
        assert_eq!(normalize_login_name("i:0#.w|i:0#.w|x"), "i:0#.w|x");
    }

    #[test]
    fn strips_single_leading_pipe() {
        assert_eq!(normalize_login_name("||org\\jdevries"), "|org\\jdevries");
    }

    #[test]
    fn leaves_plain_names_alone() {
        assert_eq!(normalize_login_name("org\\jdevries"), "org\\jdevries");
        assert_eq!(normalize_login_name(""), "");
        assert_eq!(normalize_login_name("i:0"), "i:0");
    }

    #[test]
    fn multibyte_input_does_not_panic() {
        assert_eq!(normalize_login_name("éé"), "éé");
    }
}
