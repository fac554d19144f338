use cairn_types::ObjectId;

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g. `"cairn-blob-v1"`) that is framed
/// together with the payload length in front of every hash computation:
///
/// ```text
/// <domain> SP <decimal length> NUL <payload>
/// ```
///
/// A blob and a tree with identical bytes therefore never share an id.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for blob objects.
    pub const BLOB: Self = Self {
        domain: "cairn-blob-v1",
    };
    /// Hasher for tree objects.
    pub const TREE: Self = Self {
        domain: "cairn-tree-v1",
    };
    /// Hasher for commit objects.
    pub const COMMIT: Self = Self {
        domain: "cairn-commit-v1",
    };
    /// Hasher for annotated tag objects.
    pub const TAG: Self = Self {
        domain: "cairn-tag-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> ObjectId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b" ");
        hasher.update(data.len().to_string().as_bytes());
        hasher.update(b"\0");
        hasher.update(data);
        ObjectId::from_hash(*hasher.finalize().as_bytes())
    }

    /// Verify that data produces the expected object ID.
    pub fn verify(&self, data: &[u8], expected: &ObjectId) -> bool {
        self.hash(data) == *expected
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let data = b"hello world";
        let id1 = ContentHasher::BLOB.hash(data);
        let id2 = ContentHasher::BLOB.hash(data);
        assert_eq!(id1, id2);
    }

    #[test]
    fn different_domains_produce_different_hashes() {
        let data = b"same content";
        let ids = [
            ContentHasher::BLOB.hash(data),
            ContentHasher::TREE.hash(data),
            ContentHasher::COMMIT.hash(data),
            ContentHasher::TAG.hash(data),
        ];
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn verify_correct_data() {
        let data = b"test data";
        let id = ContentHasher::BLOB.hash(data);
        assert!(ContentHasher::BLOB.verify(data, &id));
    }

    #[test]
    fn verify_incorrect_data() {
        let id = ContentHasher::BLOB.hash(b"original");
        assert!(!ContentHasher::BLOB.verify(b"tampered", &id));
    }

    #[test]
    fn empty_payload_is_not_null() {
        assert!(!ContentHasher::BLOB.hash(b"").is_null());
    }

    #[test]
    fn custom_domain() {
        let hasher = ContentHasher::new("my-custom-domain-v1");
        assert_eq!(hasher.domain(), "my-custom-domain-v1");
        assert_ne!(hasher.hash(b"data"), ContentHasher::BLOB.hash(b"data"));
    }

    #[test]
    fn framed_hash_differs_from_raw_digest() {
        let raw = ObjectId::from_bytes(b"test");
        assert_ne!(raw, ContentHasher::BLOB.hash(b"test"));
    }
}
