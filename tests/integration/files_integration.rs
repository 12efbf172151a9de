use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use utilkit::{files, json};

use crate::fixtures::TestFixtures;

#[derive(Debug, Deserialize)]
struct Address {
    city: String,
}

#[derive(Debug, Deserialize)]
struct User {
    name: String,
    age: u32,
    roles: Vec<String>,
    address: Address,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_zip_and_extract() {
        let tree = TestFixtures::create_sample_tree();
        let work = tempfile::tempdir().unwrap();
        let archive = work.path().join("tree.zip");
        let out = work.path().join("out");

        assert_eq!(files::compress_directory(tree.path(), &archive).unwrap(), 4);
        assert_eq!(files::extract_zip_file(&archive, &out).unwrap(), 4);

        for original in files::list_files_recursively(tree.path()).unwrap() {
            let relative = original.strip_prefix(tree.path()).unwrap();
            let restored = out.join(relative);
            assert!(files::compare_files(&original, &restored).unwrap(), "{}", relative.display());
            assert_eq!(
                files::sha256_hex(&original).unwrap(),
                files::sha256_hex(&restored).unwrap()
            );
        }
    }

    #[test]
    fn test_compress_files_skips_missing() {
        let tree = TestFixtures::create_sample_tree();
        let work = tempfile::tempdir().unwrap();
        let archive = work.path().join("flat.zip");
        let sources: Vec<PathBuf> = vec![
            tree.path().join("a.txt"),
            tree.path().join("missing.txt"),
            tree.path().join("nested/c.txt"),
        ];

        assert_eq!(files::compress_files(&sources, &archive).unwrap(), 2);

        let out = work.path().join("flat");
        assert_eq!(files::extract_zip_file(&archive, &out).unwrap(), 2);
        assert_eq!(files::read_file(&out.join("c.txt")).unwrap(), "charlie");
    }

    #[test]
    fn test_gzip_round_trip() {
        let tree = TestFixtures::create_sample_tree();
        let work = tempfile::tempdir().unwrap();
        let source = tree.path().join("b.log");
        let packed = work.path().join("b.log.gz");
        let unpacked = work.path().join("b.log");

        files::gzip_file(&source, &packed).unwrap();
        files::gunzip_file(&packed, &unpacked).unwrap();

        assert!(files::compare_files(&source, &unpacked).unwrap());
        assert_eq!(files::read_lines(&unpacked).unwrap(), vec!["line one", "line two"]);
    }

    #[test]
    fn test_copy_directory_preserves_tree() {
        let tree = TestFixtures::create_sample_tree();
        let work = tempfile::tempdir().unwrap();
        let target = work.path().join("copy");

        assert_eq!(files::copy_directory(tree.path(), &target).unwrap(), 4);
        assert_eq!(files::list_files_recursively(&target).unwrap().len(), 4);
        assert_eq!(
            fs::read(target.join("nested/deeper/d.bin")).unwrap(),
            vec![0u8, 1, 2, 3, 255]
        );
        assert_eq!(files::md5_hex(&target.join("a.txt")).unwrap(), files::md5_hex(&tree.path().join("a.txt")).unwrap());
    }

    #[test]
    fn test_read_sample_user_json() {
        let user: User = json::read_json_file(&TestFixtures::sample_user_path()).unwrap();
        assert_eq!(user.name, "Ada Lovelace");
        assert_eq!(user.age, 36);
        assert_eq!(user.roles, vec!["admin", "author"]);
        assert_eq!(user.address.city, "London");

        let value = json::read_json_file_as_value(&TestFixtures::sample_user_path()).unwrap();
        assert_eq!(json::extract_value::<u32>(&value, "age"), Some(36));
    }

    #[test]
    fn test_json_file_round_trip_through_disk() {
        let work = tempfile::tempdir().unwrap();
        let path = work.path().join("claims.json");
        let claims = TestFixtures::claims();

        json::write_pretty_json_file(&path, &claims).unwrap();
        let text = files::read_file(&path).unwrap();
        assert!(json::is_valid_json(&text));

        let back: serde_json::Map<String, serde_json::Value> = json::read_json_file(&path).unwrap();
        assert_eq!(back, claims);
    }
}
