//! Golden rule documents.
//!
//! Documents as they are stored on tokens. Any change to these strings is a
//! change to what every existing token holds.

/// Rules of a token as first created.
pub const RULES_ORIGINAL: &str = "key \"foo/bar\" { policy = \"read\" }\n\
                                  key \"foo/bar/baz\" { policy = \"write\" }\n\
                                  operator = \"read\"\n\
                                  service \"\" { policy = \"read\" }\n";

/// The same token after its rules are replaced.
pub const RULES_UPDATED: &str = "key \"\" { policy = \"write\" }\n\
                                 keyring = \"write\"\n\
                                 service \"some/path\" { policy = \"read\" }\n";

/// Own rules of a token that inherits [`RULES_ORIGINAL`].
pub const RULES_CHILD: &str = "key \"foo/bar\" { policy = \"write\" }\n\
                               key \"foo/bar/baz\" { policy = \"read\" }\n";

/// Extra rules inherited alongside [`RULES_ORIGINAL`].
pub const RULES_SECOND: &str = "key \"second\" { policy = \"read\" }\n";

/// Result of merging [`RULES_CHILD`] with [`RULES_ORIGINAL`] and
/// [`RULES_SECOND`].
pub const RULES_INHERITED: &str = "key \"foo/bar\" { policy = \"write\" }\n\
                                   key \"foo/bar/baz\" { policy = \"write\" }\n\
                                   key \"second\" { policy = \"read\" }\n\
                                   operator = \"read\"\n\
                                   service \"\" { policy = \"read\" }\n";

/// A hand-written document and its canonical form.
#[derive(Debug, Clone)]
pub struct DocumentVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Document as a person might write it.
    pub input: &'static str,
    /// Expected canonical re-encoding.
    pub canonical: &'static str,
}

/// Get all document vectors.
pub fn all_vectors() -> Vec<DocumentVector> {
    vec![
        DocumentVector {
            name: "canonical documents are fixed points",
            input: RULES_ORIGINAL,
            canonical: RULES_ORIGINAL,
        },
        DocumentVector {
            name: "unsorted with comments",
            input: r#"
# service access
service "some/path" {
  policy = "read"
}
keyring = "write" // cluster gossip
/* everything */
key "" { policy = "write" }
"#,
            canonical: RULES_UPDATED,
        },
        DocumentVector {
            name: "nested prefix object",
            input: r#"
key {
  "foo/bar" { policy = "read" }
  "foo/bar/baz" = { policy = "write" }
}
operator = "read"
service "" { policy = "read" }
"#,
            canonical: RULES_ORIGINAL,
        },
        DocumentVector {
            name: "upper case is folded",
            input: "KEYRING = \"WRITE\"\nService \"Some/Path\" { policy = \"Read\" }\nkey \"\" { policy = \"write\" }\n",
            canonical: RULES_UPDATED,
        },
        DocumentVector {
            name: "last policy in a block wins",
            input: "key \"second\" {\n  policy = \"write\"\n  policy = \"read\"\n}\n",
            canonical: RULES_SECOND,
        },
        DocumentVector {
            name: "blocks without a policy are dropped",
            input: "key \"second\" { policy = \"read\" }\nnode \"web\" { }\n",
            canonical: RULES_SECOND,
        },
        DocumentVector {
            name: "escaped prefix",
            input: "key \"say \\\"hi\\\"\" { policy = \"read\" }\n",
            canonical: "key \"say \\\"hi\\\"\" { policy = \"read\" }\n",
        },
        DocumentVector {
            name: "empty",
            input: "\n\n# nothing here\n",
            canonical: "",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use consul_acl_core::{decode, encode, merge};

    #[test]
    fn test_document_vectors() {
        for vector in all_vectors() {
            let rules = decode(vector.input).unwrap();
            assert_eq!(encode(&rules), vector.canonical, "vector {:?}", vector.name);
        }
    }

    #[test]
    fn test_inherited_merge() {
        let inherited = format!("{RULES_ORIGINAL}{RULES_SECOND}");
        let merged = merge(RULES_CHILD, &inherited).unwrap();
        assert_eq!(encode(&merged), RULES_INHERITED);
    }

    #[test]
    fn test_merge_with_self_is_identity() {
        for document in [RULES_ORIGINAL, RULES_UPDATED, RULES_INHERITED] {
            assert_eq!(encode(&merge(document, document).unwrap()), document);
        }
    }
}
