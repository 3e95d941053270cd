//! File-extension registry for formats Bio-Formats can open.
//!
//! Matching is a plain, case-sensitive suffix test on the path's string form,
//! so compound suffixes such as `.ome.tiff` or `.nii.gz` need no special
//! handling. The check never fails: the host probes many reader plugins per
//! path and an unknown suffix simply means "not ours".

use std::path::Path;

// =============================================================================
// Supported Suffixes
// =============================================================================

#[rustfmt::skip]
const SUPPORTED_SUFFIXES: &[&str] = &[
    ".afm", ".nef", ".lif", ".nhdr", ".ps", ".bmp", ".frm", ".pr3", ".tif",
    ".aim", ".dat", ".fits", ".pcoraw", ".qptiff", ".acff", ".xys", ".mrw",
    ".xml", ".svs", ".arf", ".dm4", ".ome.xml", ".v", ".pds", ".zvi", ".apl",
    ".mrcs", ".i2i", ".mdb", ".ipl", ".oir", ".ali", ".fff", ".vms", ".jpg",
    ".inr", ".pcx", ".vws", ".html", ".al3d", ".ims", ".bif", ".labels",
    ".dicom", ".par", ".map", ".ome.tf2", ".htd", ".tnb", ".mrc",
    ".obf", ".xdce", ".png", ".jpx", ".fli", ".psd", ".pgm", ".obsep",
    ".jpk", ".ome.tif", ".rcpnl", ".pbm", ".grey", ".raw", ".zfr", ".klb",
    ".spc", ".sdt", ".2fl", ".ndpis", ".ipm", ".pict", ".st", ".seq", ".nii",
    ".lsm", ".epsi", ".cr2", ".zfp", ".wat", ".lim", ".1sc", ".ffr", ".liff",
    ".mea", ".nd2", ".tf8", ".naf", ".ch5", ".afi", ".ipw", ".img", ".ids",
    ".mnc", ".crw", ".mtb", ".cxd", ".gel", ".dv", ".jpf", ".tga", ".vff",
    ".ome.tiff", ".ome", ".bin", ".cfg", ".dti", ".ndpi", ".c01", ".avi",
    ".sif", ".flex", ".txt", ".spe", ".ics", ".jp2", ".xv", ".spi", ".lms",
    ".sld", ".vsi", ".lei", ".sm3", ".hx", ".czi", ".nrrd", ".ppm", ".exp",
    ".mov", ".xqd", ".dm3", ".im3", ".pic", ".his", ".j2k", ".rec", ".top",
    ".pnl", ".tf2", ".oif", ".l2d", ".stk", ".fdf", ".mng", ".ome.btf",
    ".tfr", ".res", ".dm2", ".eps", ".hdr", ".am", ".stp", ".sxm",
    ".ome.tf8", ".dib", ".mvd2", ".wlz", ".nd", ".h5", ".cif", ".mod",
    ".nii.gz", ".bip", ".oib", ".csv", ".amiramesh", ".scn", ".gif",
    ".sm2", ".tiff", ".hdf", ".hed", ".r3d", ".wpi", ".dcm", ".btf",
    ".msr", ".xqf",
];

/// All suffixes this crate claims, in registry order.
pub fn supported_suffixes() -> &'static [&'static str] {
    SUPPORTED_SUFFIXES
}

/// Check whether a path ends with one of the supported suffixes.
///
/// Non-UTF-8 paths are compared on their lossy string form.
pub fn is_supported(path: impl AsRef<Path>) -> bool {
    let name = path.as_ref().to_string_lossy();
    SUPPORTED_SUFFIXES
        .iter()
        .any(|suffix| name.ends_with(suffix))
}

// =============================================================================
// Tests
// =============================================================================
