//! Constants used throughout the conformance statement generator.
//!
//! Keeps the source-tree layout, download location and template marker names in one place.

/// Base URL hosting the third-party source archives.
pub const DEFAULT_DOWNLOAD_BASE_URL: &str =
    "https://orthanc.uclouvain.be/downloads/third-party-downloads";

/// Name of the toolkit archive, without version or extension.
pub const DEFAULT_ARTIFACT_NAME: &str = "dcmtk";

/// Extension of the downloaded source archive.
pub const ARCHIVE_EXTENSION: &str = ".tar.gz";

/// CMake cache variable carrying the toolkit version.
pub const DEFAULT_VERSION_VARIABLE: &str = "DCMTK_STATIC_VERSION";

/// Path suffix identifying the UID header inside the toolkit archive.
pub const DEFAULT_MEMBER_SUFFIX: &str = "dcmdata/include/dcmtk/dcmdata/dcuid.h";

/// Build parameters file, relative to the source root.
pub const PARAMETERS_FILE: &str = "OrthancFramework/Resources/CMake/OrthancFrameworkParameters.cmake";

/// Transfer syntax data file, relative to the source root.
pub const TRANSFER_SYNTAXES_FILE: &str =
    "OrthancFramework/Resources/CodeGeneration/DicomTransferSyntaxes.json";

/// Conformance statement template, relative to the source root.
pub const TEMPLATE_FILE: &str = "OrthancServer/Resources/DicomConformanceStatement.hbs";

/// Rendered conformance statement, relative to the source root.
pub const OUTPUT_FILE: &str = "OrthancServer/Resources/DicomConformanceStatement.txt";

/// Suffix appended to a transfer syntax `Value` to form its symbolic name.
pub const TRANSFER_SYNTAX_SUFFIX: &str = "TransferSyntax";

/// Name prefix of retired SOP classes.
pub const RETIRED_PREFIX: &str = "RETIRED";

/// Name prefix of draft SOP classes.
pub const DRAFT_PREFIX: &str = "DRAFT";

/// Template binding for current Storage SOP classes.
pub const STORE_SCP_MARKER: &str = "store_scp";

/// Template binding for draft Storage SOP classes.
pub const DRAFT_STORE_SCP_MARKER: &str = "draft_store_scp";

/// Template binding for retired Storage SOP classes.
pub const RETIRED_STORE_SCP_MARKER: &str = "retired_store_scp";

/// Template binding for transfer syntaxes.
pub const TRANSFER_SYNTAXES_MARKER: &str = "transfer_syntaxes";

/// Every binding a conformance statement template must reference.
pub const TEMPLATE_MARKERS: [&str; 4] = [
    STORE_SCP_MARKER,
    DRAFT_STORE_SCP_MARKER,
    RETIRED_STORE_SCP_MARKER,
    TRANSFER_SYNTAXES_MARKER,
];
