//! Conversion par lot: fichiers isolés ou dossier organisé en groupes
//!
//! Chaque fichier suit `lecture -> document KML -> archive KMZ`. Un échec
//! est enregistré dans le rapport et le lot continue.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::color::{generate_colors, Rgb};
use crate::config::Config;
use crate::kml::TrackDocument;
use crate::kmz;
use crate::report::{BatchReport, GroupSummary};
use crate::ConvertError;

/// Fichiers d'un sous-dossier (ou de la racine) partageant une couleur
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    /// Chemins triés
    pub files: Vec<PathBuf>,
}

/// Collecte les groupes d'un dossier
///
/// Chaque sous-dossier direct contenant au moins un fichier `extension`
/// (insensible à la casse) forme un groupe à son nom. Les fichiers à la
/// racine forment le groupe `root_group`. Groupes triés par nom.
pub fn scan_groups(
    root: &Path,
    extension: &str,
    root_group: &str,
) -> Result<Vec<Group>, ConvertError> {
    let mut groups = Vec::new();
    let mut root_files = Vec::new();

    for path in sorted_entries(root)? {
        if path.is_dir() {
            let files: Vec<PathBuf> = sorted_entries(&path)?
                .into_iter()
                .filter(|p| p.is_file() && has_extension(p, extension))
                .collect();

            if !files.is_empty() {
                groups.push(Group {
                    name: file_label(&path),
                    files,
                });
            }
        } else if path.is_file() && has_extension(&path, extension) {
            root_files.push(path);
        }
    }

    if !root_files.is_empty() {
        groups.push(Group {
            name: root_group.to_string(),
            files: root_files,
        });
    }

    groups.sort_by(|a, b| a.name.cmp(&b.name));
    debug!(root = %root.display(), groups = groups.len(), "Folder scanned");
    Ok(groups)
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, ConvertError> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        entries.push(entry?.path());
    }
    entries.sort();
    Ok(entries)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Nom du fichier, sans dossier
pub(crate) fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Nom du fichier sans extension
pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Dossier parent et nom d'un dossier d'entrée (`.` est résolu)
pub(crate) fn split_folder(root: &Path) -> Result<(PathBuf, String), ConvertError> {
    let root = match root.file_name() {
        Some(_) => root.to_path_buf(),
        None => root.canonicalize()?,
    };

    let name = file_label(&root);
    let parent = root.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok((parent, name))
}

/// Convertit un tracklog en archive KMZ
///
/// Le document porte le nom du fichier d'entrée sans extension. Aucun
/// fichier n'est écrit si la trace ne contient aucun point valide.
pub fn convert_file(
    input: &Path,
    output: &Path,
    color: Rgb,
    config: &Config,
) -> Result<(), ConvertError> {
    let track = igc::parse(input)?;
    debug!(
        input = %input.display(),
        fixes = track.fixes.len(),
        pilot = ?track.pilot,
        "Track parsed"
    );

    let root = TrackDocument::from_track(&track, &file_stem(input), color, config).into_element();
    kmz::write_kmz(&root, output)
}

/// Convertit une liste de fichiers, chaque sortie à côté de son entrée
pub fn convert_files(paths: &[PathBuf], color: Rgb, config: &Config) -> BatchReport {
    let started = Instant::now();
    let total = paths.len();
    let mut report = BatchReport::new(total);

    info!(files = total, color = %color, "Starting conversion");

    for (index, input) in paths.iter().enumerate() {
        let output = input.with_extension(&config.kmz_extension);
        convert_one(input, &output, color, config, index + 1, total, &mut report);
    }

    report.set_duration(started.elapsed());
    report.finalize();
    report
}

/// Convertit un dossier, une couleur par groupe
///
/// Sortie dans `<dossier>_kmz` à côté du dossier d'entrée, un
/// sous-dossier par groupe nommé, les fichiers racine directement dedans.
///
/// # Errors
///
/// `ConvertError::NoInputFiles` si aucun tracklog n'est trouvé, erreur
/// d'I/O si le dossier est illisible ou la racine de sortie impossible à
/// créer. Les échecs par fichier sont dans le rapport.
pub fn convert_folder(root: &Path, config: &Config) -> Result<BatchReport, ConvertError> {
    let started = Instant::now();
    let (parent, name) = split_folder(root)?;

    let groups = scan_groups(root, &config.igc_extension, "")?;
    if groups.is_empty() {
        return Err(ConvertError::NoInputFiles {
            kind: config.igc_extension.to_uppercase(),
            path: root.to_path_buf(),
        });
    }

    let output_root = parent.join(format!("{}_kmz", name));
    let colors = generate_colors(groups.len());
    let total = groups.iter().map(|g| g.files.len()).sum();

    info!(
        "Found {} files in {} groups, output: {}",
        total,
        groups.len(),
        output_root.display()
    );

    std::fs::create_dir_all(&output_root)?;

    let mut report = BatchReport::new(total);
    report.output_root = Some(output_root.clone());

    let mut count = 0;
    for (index, (group, color)) in groups.iter().zip(colors).enumerate() {
        let label = if group.name.is_empty() {
            "(root)"
        } else {
            group.name.as_str()
        };
        info!(
            "[group {}/{}] {} [{}]: {} files",
            index + 1,
            groups.len(),
            label,
            color,
            group.files.len()
        );

        report.groups.push(GroupSummary {
            name: group.name.clone(),
            color,
            files: group.files.len(),
        });

        let out_dir = if group.name.is_empty() {
            output_root.clone()
        } else {
            output_root.join(&group.name)
        };

        if let Err(e) = std::fs::create_dir_all(&out_dir) {
            let e = ConvertError::from(e);
            warn!(dir = %out_dir.display(), error = %e, "Cannot create group output directory");
            for input in &group.files {
                count += 1;
                report.record_failure(file_label(input), &e);
            }
            continue;
        }

        for input in &group.files {
            count += 1;
            let output = out_dir.join(format!("{}.{}", file_stem(input), config.kmz_extension));
            convert_one(input, &output, color, config, count, total, &mut report);
        }
    }

    report.set_duration(started.elapsed());
    report.finalize();
    Ok(report)
}

fn convert_one(
    input: &Path,
    output: &Path,
    color: Rgb,
    config: &Config,
    position: usize,
    total: usize,
    report: &mut BatchReport,
) {
    let file = file_label(input);
    info!("[{}/{}] Converting {}", position, total, file);

    match convert_file(input, output, color, config) {
        Ok(()) => {
            report.record_success();
            info!("  -> {}", file_label(output));
        }
        Err(e) => {
            warn!(file = %file, error = %e, "Conversion failed");
            report.record_failure(file, &e);
        }
    }
}
