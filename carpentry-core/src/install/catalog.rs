//! Target catalog with hardcoded definitions.
//!
//! This module contains the static definitions for every install target,
//! including download URLs, digests, and destination layout. Targets are
//! listed in the order the driver installs them.

use super::types::{
    ArchiveFormat, ArchiveSource, ExistenceProbe, ExpectedDigest, InstallTarget, PostInstall,
};

// ============================================================================
// GNU Make
// ============================================================================

const MAKE_ARCHIVES: &[ArchiveSource] = &[
    ArchiveSource {
        url: "http://downloads.sourceforge.net/project/gnuwin32/make/3.81/make-3.81-bin.zip",
        format: ArchiveFormat::Zip,
        digests: &[
            ExpectedDigest::sha1("7c1e23a93e6cb78975f36efd22d598241b1f0e8b"),
            ExpectedDigest::sha512("7b67c9a32c727e3929900272ef05f5c52035b5731ab3d46abe9e641c2f28c049d094e497e5097f431ee680ace342542854d541a09ebece7730af25e69d033447"),
        ],
        probe: Some(ExistenceProbe::SubPath("bin/make.exe")),
    },
    ArchiveSource {
        url: "http://downloads.sourceforge.net/project/gnuwin32/make/3.81/make-3.81-dep.zip",
        format: ArchiveFormat::Zip,
        digests: &[
            ExpectedDigest::sha1("ee90e45c1bacc24a0c3852a95fc6dcfbcabe802b"),
            ExpectedDigest::sha512("bd4467c0d708c1deec3604754cea9428e4aa5f6e7d9ec24f62bc4d68308f12dec4661b900c1787b50327bc7eb9a482a0ae6ee863c21937c1faea414e5ccb5c04"),
        ],
        probe: Some(ExistenceProbe::SubPath("bin/libiconv2.dll")),
    },
];

const MAKE_TARGET: InstallTarget = InstallTarget {
    name: "make",
    description: "GNU Make build tool",
    archives: MAKE_ARCHIVES,
    destination: "opt/make",
    strip_components: 0,
    probe: ExistenceProbe::DestinationDir,
    path_entry: Some("bin"),
    post_install: PostInstall::None,
};

// ============================================================================
// nano
// ============================================================================

const NANO_ARCHIVES: &[ArchiveSource] = &[ArchiveSource {
    url: "http://www.nano-editor.org/dist/v2.2/NT/nano-2.2.6.zip",
    format: ArchiveFormat::Zip,
    digests: &[
        ExpectedDigest::sha1("f5348208158157060de0a4df339401f36250fe5b"),
        ExpectedDigest::sha512("83a4cdf56232c5c2f14f42275804d1af120a2346f03004ce6be384af68f73e39cbd0b9faf62f494253907d4f6606ee91b8c3c1abf6b949f27593bf41e0e3b00f"),
    ],
    probe: None,
}];

const NANO_TARGET: InstallTarget = InstallTarget {
    name: "nano",
    description: "nano text editor",
    archives: NANO_ARCHIVES,
    destination: "opt/nano",
    strip_components: 0,
    probe: ExistenceProbe::DestinationDir,
    path_entry: Some(""),
    post_install: PostInstall::None,
};

// ============================================================================
// nano syntax highlighting
// ============================================================================

const NANORC_ARCHIVES: &[ArchiveSource] = &[ArchiveSource {
    url: "http://www.nano-editor.org/dist/v2.2/nano-2.2.6.tar.gz",
    format: ArchiveFormat::Tar,
    digests: &[
        ExpectedDigest::sha1("f2a628394f8dda1b9f28c7e7b89ccb9a6dbd302a"),
        ExpectedDigest::sha512("e1ee5d63725055290a5117b73352a8557cc3105c737643e341a95ebbb0cecb06c46f86a2363de8455e9de3940e3f920c47af92e19ef9c53862de8a605da08d8d"),
    ],
    probe: None,
}];

const NANORC_TARGET: InstallTarget = InstallTarget {
    name: "nanorc",
    description: "nano syntax highlighting configs",
    archives: NANORC_ARCHIVES,
    destination: "share/nanorc",
    strip_components: 1,
    probe: ExistenceProbe::DestinationDir,
    path_entry: None,
    post_install: PostInstall::SyntaxIndex,
};

// ============================================================================
// SQLite
// ============================================================================

const SQLITE_ARCHIVES: &[ArchiveSource] = &[ArchiveSource {
    url: "http://sqlite.org/2015/sqlite-shell-win32-x86-3090200.zip",
    format: ArchiveFormat::Zip,
    digests: &[
        ExpectedDigest::sha1("25d78bbba37d2a0d9b9f86ed897e454ccc94d7b2"),
        ExpectedDigest::sha512("e4eb51f674262cf65e0fe6e6d64c4ddb30301adcb295874fb1c5a6c522642f402b326ad8f46cd79d5b8db7bcac552d0cb79e114d93291c910b08eeee0a949848"),
    ],
    probe: None,
}];

const SQLITE_TARGET: InstallTarget = InstallTarget {
    name: "sqlite",
    description: "SQLite database shell",
    archives: SQLITE_ARCHIVES,
    destination: "opt/sqlite",
    strip_components: 0,
    probe: ExistenceProbe::DestinationDir,
    path_entry: Some(""),
    post_install: PostInstall::None,
};

// ============================================================================
// Catalog Access
// ============================================================================

static ALL_TARGETS: [InstallTarget; 4] = [MAKE_TARGET, NANO_TARGET, NANORC_TARGET, SQLITE_TARGET];

/// Returns every target, in install order.
pub fn all_targets() -> &'static [InstallTarget] {
    &ALL_TARGETS
}

/// Looks a target up by name.
pub fn find_target(name: &str) -> Option<&'static InstallTarget> {
    ALL_TARGETS.iter().find(|t| t.name.eq_ignore_ascii_case(name))
}
