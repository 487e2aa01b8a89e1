//! Archives KMZ: un zip contenant une seule entrée `doc.kml`

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::kml::{self, Element};
use crate::ConvertError;

/// Nom de l'entrée KML dans l'archive
pub const DOC_ENTRY: &str = "doc.kml";

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Écrit l'arbre dans une nouvelle archive KMZ (écrase le fichier existant)
///
/// Les dossiers parents sont créés si besoin.
pub fn write_kmz(root: &Element, path: &Path) -> Result<(), ConvertError> {
    let xml = kml::to_string(root)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(DOC_ENTRY, options)?;
    zip.write_all(XML_DECLARATION.as_bytes())?;
    zip.write_all(xml.as_bytes())?;
    zip.finish()?;

    debug!(path = %path.display(), bytes = xml.len(), "KMZ written");
    Ok(())
}

/// Lit et parse le `doc.kml` d'une archive
///
/// # Errors
///
/// Erreur zip/I/O si l'archive est illisible ou sans `doc.kml`,
/// `ConvertError::Xml` si le KML est mal formé et
/// `ConvertError::MissingDocument` s'il ne contient aucun élément.
pub fn read_document(path: &Path) -> Result<Element, ConvertError> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;
    let mut entry = archive.by_name(DOC_ENTRY)?;

    let mut data = Vec::new();
    entry.read_to_end(&mut data)?;
    let xml = String::from_utf8_lossy(&data);

    kml::parse_str(&xml)?.ok_or_else(|| ConvertError::MissingDocument(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kml::KML_NS;

    fn sample() -> Element {
        Element::kml("kml").with_child(
            Element::kml("Document").with_child(Element::kml("name").with_text("flight")),
        )
    }

    #[test]
    fn test_write_single_entry_with_declaration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flight.kmz");
        write_kmz(&sample(), &path).unwrap();

        let mut archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(archive.len(), 1);

        let mut entry = archive.by_name(DOC_ENTRY).unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Deflated);

        let mut xml = String::new();
        entry.read_to_string(&mut xml).unwrap();
        assert!(xml.starts_with(XML_DECLARATION));
        assert_eq!(xml.matches("<?xml").count(), 1);
        assert!(xml.contains(KML_NS));
    }

    #[test]
    fn test_write_creates_parents_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("flight.kmz");

        write_kmz(&sample(), &path).unwrap();
        write_kmz(&sample(), &path).unwrap();

        assert_eq!(read_document(&path).unwrap(), sample());
    }

    #[test]
    fn test_read_not_an_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.kmz");
        std::fs::write(&path, b"not a zip").unwrap();

        assert!(matches!(read_document(&path), Err(ConvertError::Zip(_))));
    }

    #[test]
    fn test_read_without_doc_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.kmz");

        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        zip.start_file("other.kml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"<kml/>").unwrap();
        zip.finish().unwrap();

        assert!(matches!(read_document(&path), Err(ConvertError::Zip(_))));
    }
}
