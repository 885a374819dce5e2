use std::fs;
use std::io;
use std::path::Path;
use tracing::info;

/// Rewrite Resource.cfg so the game loads packages up to `depth` folders deep.
pub fn rewrite_resource_cfg(mods_dir: &Path, depth: usize) -> io::Result<()> {
    let mut lines = vec![
        "Priority 500".to_string(),
        "PackedFile *.package".to_string(),
    ];
    for level in 1..depth {
        lines.push(format!("PackedFile {}*.package", "*/".repeat(level)));
    }

    let cfg = mods_dir.join("Resource.cfg");
    fs::write(&cfg, lines.join("\n") + "\n")?;
    info!("Resource.cfg rewritten (depth {})", depth);
    Ok(())
}
