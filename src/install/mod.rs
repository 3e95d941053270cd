//! Provisioning: the Bio-Formats jar and sample data.

mod fetch;
mod jar;
mod samples;

pub use fetch::{Fetcher, HttpFetcher};
pub use jar::{
    artifact_url, download_loci_jar, find_jar, find_writable_location, jar_locations,
    parse_checksum_file, verify_checksum, ChecksumKind, JAR_DIR_ENV, LOCI_TOOLS_JAR,
};
pub use samples::{fetch_samples, SAMPLES_BASE_URL, SAMPLE_ARCHIVES};
