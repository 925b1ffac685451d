// tests/option_resolution.rs

//! Option resolution across generic, platform and flavor keys.

mod common;

use cmmi::{BuildConfiguration, Fingerprint, HostConfig, Options, Platform};
use common::{options, PKG_URL};
use std::path::{Path, PathBuf};

fn host() -> HostConfig {
    HostConfig::rooted_at(Path::new("/srv/build"))
}

fn resolve_on(pairs: &[(&str, &str)], platform: &Platform) -> (BuildConfiguration, Options) {
    let mut opts = options(pairs);
    opts.set("url", PKG_URL);
    let config = BuildConfiguration::resolve("pkg", &mut opts, platform, &host()).unwrap();
    (config, opts)
}

fn resolve(pairs: &[(&str, &str)]) -> BuildConfiguration {
    resolve_on(pairs, &Platform::new("linux")).0
}

#[test]
fn test_platform_key_overrides_generic() {
    let config = resolve(&[
        ("make-binary", "bmake"),
        ("make-binary-linux", "remake"),
        ("make-options", "-j2"),
        ("make-options-linux", "-j8"),
        ("makedir", "src"),
        ("makedir-linux", "build/src"),
        ("makeinstalldir", "a"),
        ("makeinstalldir-linux", "b"),
        ("make-targets", "all"),
        ("make-targets-linux", "world\ncheck"),
        ("configure", "configure.sh"),
        ("configure-linux", "Configure"),
    ]);

    assert_eq!(config.make_binary, "remake");
    assert_eq!(config.make_options, "-j8");
    assert_eq!(config.makedir.as_deref(), Some("build/src"));
    assert_eq!(config.makeinstalldir.as_deref(), Some("b"));
    assert_eq!(config.make_targets, vec!["world", "check"]);
    assert_eq!(config.configure, "Configure");
}

#[test]
fn test_generic_used_when_platform_key_absent() {
    let config = resolve(&[
        ("make-binary-freebsd", "gmake"),
        ("make-options", "-j2"),
        ("makedir", "src"),
    ]);

    assert_eq!(config.make_binary, "make");
    assert_eq!(config.make_options, "-j2");
    assert_eq!(config.makedir.as_deref(), Some("src"));
}

#[test]
fn test_configure_options_append() {
    let config = resolve(&[
        ("configure-options", "--enable-shared\n--with-zlib"),
        ("extra_options", "--disable-docs"),
        ("configure-options-linux", "--with-pic"),
        ("configure-options-freebsd", "--without-pic"),
    ]);

    assert_eq!(
        config.configure_options,
        "--enable-shared --with-zlib --disable-docs --with-pic"
    );
    assert_eq!(
        config.extra_options,
        "--enable-shared --with-zlib --disable-docs"
    );
}

#[test]
fn test_configure_options_replace() {
    let config = resolve(&[
        ("configure-options", "--enable-shared"),
        ("extra_options", "--disable-docs"),
        ("configure-options-linux", "--with-pic"),
        ("configure-options-replace-linux", "--static-only"),
    ]);

    assert_eq!(config.configure_options, "--static-only");
    // The fingerprinted part is unaffected by platform merges
    assert_eq!(config.extra_options, "--enable-shared --disable-docs");
}

#[test]
fn test_darwin_flavor_is_appended_last() {
    let leopard = Platform::new("darwin").with_kernel_release("9.8.0");
    let (config, _) = resolve_on(
        &[
            ("configure-options", "--a"),
            ("configure-options-darwin", "--b"),
            ("configure-options-replace-darwin", "--replaced"),
            ("configure-options-leopard", "--leopard"),
            ("configure-options-snowleopard", "--snow"),
            ("configure-darwin", "configure.darwin"),
            ("configure-leopard", "configure.leopard"),
        ],
        &leopard,
    );

    assert_eq!(config.configure_options, "--replaced --leopard");
    assert_eq!(config.configure, "configure.leopard");

    let unknown = Platform::new("darwin").with_kernel_release("22.6.0");
    let (config, _) = resolve_on(
        &[
            ("configure-options-darwin", "--b"),
            ("configure-options-leopard", "--leopard"),
            ("configure-darwin", "configure.darwin"),
        ],
        &unknown,
    );
    assert_eq!(config.configure_options, "--b");
    assert_eq!(config.configure, "configure.darwin");
}

#[test]
fn test_empty_make_targets_mean_one_plain_make() {
    assert_eq!(resolve(&[]).make_targets, vec![String::new()]);
    assert_eq!(resolve(&[("make-targets", "")]).make_targets, vec![String::new()]);
    assert_eq!(
        resolve(&[("make-targets", "\n  \n")]).make_targets,
        vec![String::new()]
    );
}

#[test]
fn test_install_targets() {
    assert_eq!(resolve(&[]).install_targets, vec!["install"]);
    assert_eq!(
        resolve(&[("make-install-targets", "install-lib\ninstall-headers")]).install_targets,
        vec!["install-lib", "install-headers"]
    );
}

#[test]
fn test_skip_flags_in_either_form() {
    let generic = resolve(&[("noconfigure", ""), ("nomake", ""), ("noinstall", "")]);
    assert!(generic.skip.noconfigure && generic.skip.nomake && generic.skip.noinstall);

    let suffixed = resolve(&[
        ("noconfigure-linux", ""),
        ("nomake-linux", ""),
        ("noinstall-linux", ""),
    ]);
    assert!(suffixed.skip.noconfigure && suffixed.skip.nomake && suffixed.skip.noinstall);

    let other_platform = resolve(&[("nomake-freebsd", "")]);
    assert!(!other_platform.skip.nomake);
}

#[test]
fn test_prefix_option_and_location() {
    let config = resolve(&[("prefix-separator", ""), ("location", "/opt/pkg")]);
    assert_eq!(config.prefix_option, "--prefix ");
    assert_eq!(config.prefix, PathBuf::from("/opt/pkg"));

    let config = resolve(&[("prefix-option", "PREFIX=")]);
    assert_eq!(config.prefix_option, "PREFIX=");
    assert_eq!(config.prefix, PathBuf::from("/srv/build/parts/pkg"));
}

#[test]
fn test_resolved_values_are_written_back() {
    let (_, opts) = resolve_on(
        &[
            ("configure-options", "--a"),
            ("configure-options-linux", "--b"),
            ("make-targets-linux", "all"),
        ],
        &Platform::new("linux"),
    );

    assert_eq!(opts.get("configure-options"), Some("--a --b"));
    assert_eq!(opts.get("make-binary"), Some("make"));
    assert_eq!(opts.get("make-options"), Some(""));
    assert_eq!(opts.get("make-targets"), Some("all"));
    assert_eq!(opts.get("make-install-targets"), Some("install"));
    assert_eq!(opts.get("location"), None);
}

#[test]
fn test_fingerprint_tracks_identifying_options() {
    let base = [
        ("extra_options", "--x"),
        ("autogen", "autogen.sh"),
        ("patch-binary", "patch"),
        ("patch-options", "-p1"),
        ("environment", "CC=gcc"),
    ];
    let fp = |pairs: &[(&str, &str)]| Fingerprint::compute(&resolve(pairs));
    let reference = fp(&base);

    assert_eq!(reference, fp(&base));

    let mut with_comment = base.to_vec();
    with_comment.push(("comment", "rebuilt on tuesday"));
    with_comment.push(("make-targets", "all"));
    assert_eq!(reference, fp(&with_comment));

    for (key, value) in [
        ("extra_options", "--y"),
        ("autogen", "bootstrap"),
        ("patch-binary", "gpatch"),
        ("patch-options", "-p0"),
        ("environment", "CC=clang"),
    ] {
        let changed: Vec<(&str, &str)> = base
            .iter()
            .map(|&(k, v)| if k == key { (k, value) } else { (k, v) })
            .collect();
        assert_ne!(reference, fp(&changed), "changing {key} must change the fingerprint");
    }

    let mut other_url = options(&base);
    other_url.set("url", "http://x/pkg-2.0.tar.gz");
    let other =
        BuildConfiguration::resolve("pkg", &mut other_url, &Platform::new("linux"), &host())
            .unwrap();
    assert_ne!(reference, Fingerprint::compute(&other));
}
