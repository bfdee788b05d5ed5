//! Integration tests for build-report parsing

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use proptest::prelude::*;
    use repro_buildinfo::*;
    use repro_config::ReportConfig;
    use repro_errors::ReportError;
    use repro_net::NetClient;
    use repro_types::PackageTarget;

    const COREUTILS: &str = "\
Format: 0.2
Source: coreutils
Binary: coreutils
Architecture: amd64
Version: 8.25-2
Checksums-Md5:
 2f0fdc1a1d0e1f4e1c5c8c1f0f2b6e3a 2798562 coreutils_8.25-2_amd64.deb
Checksums-Sha256:
 0f3b8e4bb0a4d7dbb4ba24b5a2a1d1cbb1bf9c2c6a6b8f9b50e4e7bbde1a4b0c 1021 coreutils_8.25-2.dsc
 9c4ad2c3b5e1d8c9b3b42d6d0f8a7e9b1c2d3e4f5a6b7c8d9e0f1a2b3c4d5e6f 2798562 coreutils_8.25-2_amd64.deb
 aaaa2c3b5e1d8c9b3b42d6d0f8a7e9b1c2d3e4f5a6b7c8d9e0f1a2b3c4d5e6f 3000000 coreutils_8.25-2_amd64.deb
Build-Origin: Debian
Build-Architecture: amd64
Installed-Build-Depends:
 acl (= 2.2.52-3),
 attr (= 1:2.4.47-2),
 base-files (= 9.6),

 gcc-5 (= 5.4.0-6)
";

    #[test]
    fn test_parse_coreutils_report() {
        let info = parse(COREUTILS, "coreutils");

        assert_eq!(info.version, "8.25-2");
        assert_eq!(info.short_version, "8.25-2");
        assert_eq!(info.binary_name, "coreutils");
        assert_eq!(info.source_dir, "coreutils");
        assert_eq!(info.binary_filename, "coreutils_8.25-2_amd64.deb");
        // first matching checksum line wins
        assert!(info.checksum.starts_with("9c4ad2c3"));
        assert_eq!(info.size, "2798562");
        assert_eq!(
            info.dependencies,
            vec![
                "acl=2.2.52-3",
                "attr=1:2.4.47-2",
                "base-files=9.6",
                "gcc-5=5.4.0-6"
            ]
        );
        assert!(info.validate().is_ok());
    }

    #[test]
    fn test_md5_block_is_not_a_checksum_source() {
        let info = parse(COREUTILS, "coreutils");
        assert_ne!(info.checksum, "2f0fdc1a1d0e1f4e1c5c8c1f0f2b6e3a");
    }

    #[test]
    fn test_epoch_qualified_version() {
        let report = "Source: foo\nBinary: foo\nVersion: 2:1.3-4\nChecksums-Sha256:\n abc 10 foo_1.3-4_amd64.deb\nInstalled-Build-Depends:\n";
        let info = parse(report, "foo");

        assert_eq!(info.version, "2:1.3-4");
        assert_eq!(info.short_version, "1.3-4");
        assert_eq!(info.binary_filename, "foo_1.3-4_amd64.deb");
    }

    #[test]
    fn test_binary_disambiguation() {
        let info = parse("Binary: foo foo-dbg\n", "foo");
        assert_eq!(info.binary_name, "foo");

        let info = parse("Binary: bar1 bar-common\n", "bar");
        assert_eq!(info.binary_name, "bar1");

        let info = parse("Binary: libacl1 acl\n", "attr");
        assert_eq!(info.binary_name, "libacl1");
    }

    #[test]
    fn test_parse_is_idempotent() {
        assert_eq!(parse(COREUTILS, "coreutils"), parse(COREUTILS, "coreutils"));
    }

    #[test]
    fn test_missing_dependency_marker() {
        let report = "Source: acl\nBinary: acl\nVersion: 2.2.52-3\n";
        let info = parse(report, "acl");

        assert!(info.dependencies.is_empty());
        assert!(!info.has_dependency_block);
        let err = info.validate().unwrap_err();
        match err {
            ReportError::MalformedReport { package, missing } => {
                assert_eq!(package, "acl");
                assert_eq!(missing, vec!["Installed-Build-Depends"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_headers_stay_empty() {
        let info = parse("Installed-Build-Depends:\n acl (= 1),\n", "acl");
        assert!(info.version.is_empty());
        assert!(info.binary_name.is_empty());
        assert_eq!(info.dependencies, vec!["acl=1"]);

        let err = info.validate().unwrap_err();
        assert!(matches!(
            err,
            ReportError::MalformedReport { ref missing, .. } if missing.len() == 3
        ));
    }

    #[test]
    fn test_markers_tolerate_trailing_whitespace() {
        let report = "Binary: acl\nVersion: 1-1\nChecksums-Sha256:  \r\n ff 5 acl_1-1_amd64.deb\nInstalled-Build-Depends: \r\n zlib1g (= 1),\r\n";
        let info = parse(report, "acl");
        assert_eq!(info.checksum, "ff");
        assert_eq!(info.dependencies, vec!["zlib1g=1"]);
    }

    #[test]
    fn test_headers_after_dependency_marker_are_dependencies() {
        let report = "Installed-Build-Depends:\n acl (= 1)\nVersion: 9\n";
        let info = parse(report, "acl");
        assert!(info.version.is_empty());
        assert_eq!(info.dependencies, vec!["acl=1", "Version:9"]);
    }

    #[test]
    fn test_apply_to_target() {
        let info = parse(COREUTILS, "coreutils");
        let mut target = PackageTarget::new("coreutils");
        info.apply_to(&mut target);

        assert_eq!(target.pinned_spec(), "coreutils=8.25-2");
        assert_eq!(target.source_build_dir(), "coreutils-8.25/");
        assert_eq!(target.expected_size, "2798562");
        assert_eq!(target.build_depends.len(), 4);
    }

    #[tokio::test]
    async fn test_http_report_service() {
        let server = MockServer::start();
        let page = server.mock(|when, then| {
            when.method(GET)
                .path("/debian/rb-pkg/testing/amd64/coreutils.html");
            then.status(200).body(
                r#"<header><span class="build-time">tested 2016-06-01 10:00 UTC</span>
<a href="/debian/buildinfo/coreutils_8.25-2_amd64.buildinfo" title="Show: build info">buildinfo</a></header>"#,
            );
        });
        let report = server.mock(|when, then| {
            when.method(GET)
                .path("/debian/buildinfo/coreutils_8.25-2_amd64.buildinfo");
            then.status(200).body(COREUTILS);
        });
        let index = server.mock(|when, then| {
            when.method(GET)
                .path("/debian/testing/amd64/index_reproducible.html");
            then.status(200)
                .body(r#"<code><a class="package" href="/a">acl</a> <a class="package" href="/b">tar</a></code>"#);
        });

        let config = ReportConfig {
            url: server.base_url(),
            ..ReportConfig::default()
        };
        let service = HttpReportService::new(NetClient::with_defaults().unwrap(), config);

        let package_page = service.package_page("coreutils").await.unwrap();
        assert_eq!(
            package_page.build_time.format(BUILD_TIME_FORMAT).to_string(),
            "2016-06-01 10:00"
        );
        let text = service.build_report(&package_page).await.unwrap();
        assert_eq!(parse(&text, "coreutils").version, "8.25-2");

        let names = service.reproducible_packages().await.unwrap();
        assert_eq!(names, vec!["acl", "tar"]);

        page.assert();
        report.assert();
        index.assert();
    }

    proptest! {
        #[test]
        fn prop_parse_never_panics_and_is_deterministic(report in "(?s).{0,400}", name in "[a-z]{1,8}") {
            let first = parse(&report, &name);
            let second = parse(&report, &name);
            prop_assert_eq!(&first, &second);
            prop_assert!(first.dependencies.iter().all(|d| !d.is_empty()));
        }

        #[test]
        fn prop_normalized_dependency_has_no_markup(line in "[ a-z0-9().,=:+~-]{0,40}") {
            let dep = normalize_dependency(&line);
            prop_assert!(!dep.contains(['(', ')', ',']));
            prop_assert_eq!(dep.trim(), dep.as_str());
        }
    }
}
