//! Fusion d'archives KMZ en un document unique organisé en dossiers
//!
//! Les identifiants de style de chaque archive sont préfixés par le nom
//! de l'archive (`<stem>_trackStyle`) pour éviter les collisions entre
//! traces, et les `styleUrl` locaux des placemarks suivent.

use std::path::Path;
use std::time::Instant;

use tracing::{info, warn};

use crate::batch::{file_label, file_stem, scan_groups, split_folder};
use crate::config::Config;
use crate::kml::{Element, KML_NS};
use crate::kmz;
use crate::report::MergeReport;
use crate::ConvertError;

/// Nom du dossier KML regroupant les archives à la racine
pub const ROOT_FOLDER: &str = "(root)";

/// Fusionne les archives d'un dossier dans `<dossier>_merged.kmz`
///
/// Une archive illisible ou sans élément Document est ignorée avec un
/// warning et listée dans le rapport.
///
/// # Errors
///
/// `ConvertError::NoInputFiles` si aucune archive n'est trouvée, erreur
/// d'I/O ou d'écriture si l'archive fusionnée ne peut pas être produite.
pub fn merge_folder(root: &Path, config: &Config) -> Result<MergeReport, ConvertError> {
    let started = Instant::now();
    let (parent, name) = split_folder(root)?;

    let groups = scan_groups(root, &config.kmz_extension, ROOT_FOLDER)?;
    if groups.is_empty() {
        return Err(ConvertError::NoInputFiles {
            kind: config.kmz_extension.to_uppercase(),
            path: root.to_path_buf(),
        });
    }

    let output = parent.join(format!("{}_merged.{}", name, config.kmz_extension));
    let mut report = MergeReport::new(output.clone());

    info!(
        "Merging {} archives from {} folders",
        groups.iter().map(|g| g.files.len()).sum::<usize>(),
        groups.len()
    );

    let mut document = Element::kml("Document").with_child(Element::kml("name").with_text(&name));

    for group in &groups {
        let mut folder = Element::kml("Folder").with_child(Element::kml("name").with_text(&group.name));
        info!(folder = %group.name, archives = group.files.len(), "Merging folder");

        for archive in &group.files {
            let file = file_label(archive);
            info!("  Adding {}", file);

            match merge_archive(archive, &mut folder) {
                Ok(()) => report.record_merged(),
                Err(e) => {
                    warn!(archive = %file, error = %e, "Skipping archive");
                    report.record_skipped(file, &e);
                }
            }
        }

        report.groups.push(group.name.clone());
        document.push(folder);
    }

    let kml = Element::kml("kml").with_child(document);
    kmz::write_kmz(&kml, &output)?;

    info!(output = %output.display(), "Merged archive written");

    report.set_duration(started.elapsed());
    report.finalize();
    Ok(report)
}

/// Déplace les styles puis les placemarks d'une archive dans `folder`
fn merge_archive(archive: &Path, folder: &mut Element) -> Result<(), ConvertError> {
    let mut root =
        kmz::read_document(archive).map_err(|e| ConvertError::archive_read(archive, e))?;
    let mut document = take_document(&mut root)
        .ok_or_else(|| ConvertError::MissingDocument(archive.to_path_buf()))?;

    let prefix = format!("{}_", file_stem(archive));
    let namespace = document.namespace.clone();
    let namespace = namespace.as_deref();

    for mut style in document.take_children(namespace, "Style") {
        let id = style.attr("id").unwrap_or_default().to_string();
        style.set_attr("id", format!("{}{}", prefix, id));
        folder.push(style);
    }

    for mut placemark in document.take_children(namespace, "Placemark") {
        if let Some(style_url) = placemark.find_mut(namespace, "styleUrl") {
            let target = style_url.text();
            if let Some(local) = target.strip_prefix('#') {
                style_url.set_text(format!("#{}{}", prefix, local));
            }
        }
        folder.push(placemark);
    }

    Ok(())
}

/// Retire l'élément Document de la racine (qualifié KML d'abord)
fn take_document(root: &mut Element) -> Option<Element> {
    let mut documents = root.take_children(Some(KML_NS), "Document");
    if documents.is_empty() {
        documents = root.take_children(None, "Document");
    }
    documents.into_iter().next()
}
