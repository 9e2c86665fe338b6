//! Packager: resolves identifiers once, then fetches, converts and writes
//! every item into a single Simple Archive Format zip.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::{PackagerConfig, DIM_METADATA_PREFIX, ORE_METADATA_PREFIX};
use crate::dim::{convert, DcDescriptor, NativeMetadataRecord};
use crate::error::{PackagerError, Result};
use crate::oai::OaiClient;
use crate::resolver::{resolve, OaiIdentifier, RepositoryIdentifier};
use crate::saf::{
    render_dublin_core, ArchiveItem, ResourceMap, CONTENTS_FILE, CONTENTS_MANIFEST,
    DUBLIN_CORE_FILE, ORE_FILE,
};

/// Builds one archive for a list of item handles in one repository.
#[derive(Debug)]
pub struct Packager {
    config: PackagerConfig,
    client: OaiClient,
    repository: RepositoryIdentifier,
    handles: Vec<String>,
    identifiers: Vec<OaiIdentifier>,
    output_file: PathBuf,
    dc_elements: BTreeSet<String>,
}

impl Packager {
    /// Create a packager, resolving the repository identifier and composing
    /// the OAI identifier of every handle up front.
    ///
    /// Fails before any item is fetched if the handle list is empty, the
    /// base URL is malformed, or identifier resolution fails.
    pub fn new<S: AsRef<str>>(config: PackagerConfig, handles: &[S]) -> Result<Self> {
        if handles.is_empty() {
            return Err(PackagerError::NoHandles);
        }
        let client = OaiClient::new(&config.base_url, config.verify_tls)?;
        Self::with_client(config, client, handles)
    }

    /// Like [`Packager::new`], with a preconfigured client.
    pub fn with_client<S: AsRef<str>>(
        config: PackagerConfig,
        client: OaiClient,
        handles: &[S],
    ) -> Result<Self> {
        if handles.is_empty() {
            return Err(PackagerError::NoHandles);
        }

        let repository = resolve(&client, &config.base_url, &config.exceptions)?;
        let use_id_prefix = config.effective_use_id_prefix();

        let handles = handles
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                let raw = raw.as_ref();
                let handle = repository.normalize_handle(raw, use_id_prefix);
                if handle.is_empty() {
                    return Err(PackagerError::EmptyHandle {
                        number: index + 1,
                        raw: raw.to_string(),
                    });
                }
                Ok(handle)
            })
            .collect::<Result<Vec<String>>>()?;
        let identifiers: Vec<OaiIdentifier> =
            handles.iter().map(|h| repository.compose(h)).collect();
        let output_file = config.resolve_output_file();

        tracing::debug!(
            base_url = %config.base_url,
            endpoint = client.endpoint(),
            verify_tls = config.verify_tls,
            use_id_prefix,
            repository = ?repository,
            identifiers = ?identifiers,
            output_file = %output_file.display(),
            "Packager configured"
        );

        Ok(Self {
            config,
            client,
            repository,
            handles,
            identifiers,
            output_file,
            dc_elements: BTreeSet::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &PackagerConfig {
        &self.config
    }

    #[must_use]
    pub fn repository(&self) -> &RepositoryIdentifier {
        &self.repository
    }

    /// Normalised handles, in input order.
    #[must_use]
    pub fn handles(&self) -> &[String] {
        &self.handles
    }

    /// OAI identifiers, one per handle, in input order.
    #[must_use]
    pub fn identifiers(&self) -> &[OaiIdentifier] {
        &self.identifiers
    }

    /// Where [`Packager::build_package`] writes the archive.
    #[must_use]
    pub fn output_file(&self) -> &Path {
        &self.output_file
    }

    /// `dc.element[.qualifier]` keys seen across all items of the last build.
    #[must_use]
    pub fn dc_elements(&self) -> &BTreeSet<String> {
        &self.dc_elements
    }

    /// Fetch and convert one item without writing anything.
    pub fn fetch_item(&self, index: usize) -> Result<ArchiveItem> {
        let identifier = self
            .identifiers
            .get(index)
            .ok_or_else(|| PackagerError::ItemOutOfRange {
                number: index + 1,
                count: self.identifiers.len(),
            })?;

        let descriptors = self.fetch_descriptors(identifier)?;
        let resource_map = self.fetch_resource_map(identifier)?;
        Ok(ArchiveItem {
            descriptors,
            resource_map,
        })
    }

    /// Build the archive and return its path.
    ///
    /// Items are processed one at a time in input order into directories
    /// `1..=N`. The archive is assembled in a hidden temporary file next to
    /// the destination and renamed into place only after every item
    /// succeeded; on any failure the temporary file is removed and the error
    /// returned. [`Packager::dc_elements`] is only updated on success.
    pub fn build_package(&mut self) -> Result<PathBuf> {
        self.dc_elements.clear();

        if let Some(parent) = self.output_file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_file = temp_path(&self.output_file);
        let file = File::create(&temp_file)?;
        let dc_elements = match self
            .write_archive(file)
            .and_then(|keys| self.commit(&temp_file).map(|()| keys))
        {
            Ok(keys) => keys,
            Err(e) => {
                discard(&temp_file);
                return Err(e);
            }
        };

        self.dc_elements = dc_elements;
        tracing::info!(
            path = %self.output_file.display(),
            items = self.identifiers.len(),
            "Archive written"
        );
        Ok(self.output_file.clone())
    }

    /// Move the finished temporary archive onto the destination path.
    fn commit(&self, temp_file: &Path) -> Result<()> {
        // On Windows, rename fails if the destination already exists
        #[cfg(target_os = "windows")]
        if self.output_file.is_file() {
            fs::remove_file(&self.output_file)?;
        }

        fs::rename(temp_file, &self.output_file)?;
        Ok(())
    }

    /// Write every item and return the DC element keys seen.
    fn write_archive(&self, file: File) -> Result<BTreeSet<String>> {
        let mut zip = ZipWriter::new(file);
        let mut dc_elements = BTreeSet::new();

        for (index, identifier) in self.identifiers.iter().enumerate() {
            let dir = (index + 1).to_string();
            tracing::info!(item = %dir, identifier = %identifier, "Packaging item");

            let descriptors = self.write_item(&mut zip, &dir, identifier)?;
            dc_elements.extend(descriptors.iter().map(DcDescriptor::key));
        }

        let file = zip.finish()?;
        file.sync_all()?;
        Ok(dc_elements)
    }

    /// Write the three files of one item directory, DC before ORE.
    fn write_item<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        dir: &str,
        identifier: &OaiIdentifier,
    ) -> Result<Vec<DcDescriptor>> {
        let descriptors = self.fetch_descriptors(identifier)?;
        write_entry(zip, dir, DUBLIN_CORE_FILE, &render_dublin_core(&descriptors))?;

        let resource_map = self.fetch_resource_map(identifier)?;
        write_entry(zip, dir, ORE_FILE, resource_map.as_str())?;

        write_entry(zip, dir, CONTENTS_FILE, CONTENTS_MANIFEST)?;
        Ok(descriptors)
    }

    fn fetch_descriptors(&self, identifier: &OaiIdentifier) -> Result<Vec<DcDescriptor>> {
        let record = self
            .client
            .get_record(DIM_METADATA_PREFIX, identifier.as_str())?;
        let native = NativeMetadataRecord::from_record(&record, self.client.namespaces())?;
        convert(&native)
    }

    fn fetch_resource_map(&self, identifier: &OaiIdentifier) -> Result<ResourceMap> {
        let record = self
            .client
            .get_record(ORE_METADATA_PREFIX, identifier.as_str())?;
        ResourceMap::from_record(&record, self.client.namespaces())
    }
}

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

fn write_entry<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    dir: &str,
    name: &str,
    content: &str,
) -> Result<()> {
    zip.start_file(format!("{dir}/{name}"), entry_options())?;
    zip.write_all(content.as_bytes())?;
    Ok(())
}

/// Remove a partial archive, logging instead of failing.
fn discard(temp_file: &Path) {
    if let Err(e) = fs::remove_file(temp_file) {
        tracing::warn!(
            path = %temp_file.display(),
            error = %e,
            "Failed to remove partial archive"
        );
    }
}

/// Hidden sibling of `output` used while the archive is being written.
fn temp_path(output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "package.zip".to_string());
    output.with_file_name(format!(".{name}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::exceptions::{RepositoryException, RepositoryExceptions};

    #[test]
    fn test_temp_path() {
        assert_eq!(
            temp_path(Path::new("/data/out/item.zip")),
            PathBuf::from("/data/out/.item.zip.tmp")
        );
        assert_eq!(temp_path(Path::new("item.zip")), PathBuf::from(".item.zip.tmp"));
    }

    #[test]
    fn test_new_rejects_empty_handle_list() {
        let config = PackagerConfig::new("https://repo.example").unwrap();
        let handles: [&str; 0] = [];
        let err = Packager::new(config, &handles).unwrap_err();
        assert!(matches!(err, PackagerError::NoHandles));
    }

    fn overridden_config() -> PackagerConfig {
        let mut exceptions = RepositoryExceptions::default();
        exceptions.insert(
            "https://repo.example",
            RepositoryException {
                id: Some("example.repo".to_string()),
                use_id_prefix: false,
            },
        );
        PackagerConfig::new("https://repo.example")
            .unwrap()
            .with_exceptions(exceptions)
    }

    #[test]
    fn test_new_composes_identifiers_without_network() {
        let packager = Packager::new(overridden_config(), &["/10673/7/", "10673/8"]).unwrap();
        let identifiers: Vec<&str> = packager.identifiers().iter().map(|i| i.as_str()).collect();
        assert_eq!(
            identifiers,
            vec!["oai:example.repo:10673/7", "oai:example.repo:10673/8"]
        );
    }

    #[test]
    fn test_new_rejects_empty_handles() {
        for raw in ["", "/", "//"] {
            let err = Packager::new(overridden_config(), &["10673/7", raw]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config);
            assert!(matches!(
                err,
                PackagerError::EmptyHandle { number: 2, .. }
            ));
        }
    }

    #[test]
    fn test_discard_missing_file_is_harmless() {
        let dir = tempfile::tempdir().unwrap();
        discard(&dir.path().join(".missing.zip.tmp"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_write_entry_layout() {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        write_entry(&mut zip, "1", CONTENTS_FILE, CONTENTS_MANIFEST).unwrap();
        let cursor = zip.finish().unwrap();

        let mut archive = zip::ZipArchive::new(cursor).unwrap();
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        assert_eq!(names, vec!["1/contents".to_string()]);

        let mut contents = String::new();
        std::io::Read::read_to_string(&mut archive.by_name("1/contents").unwrap(), &mut contents)
            .unwrap();
        assert_eq!(contents, "ORE.xml\tbundle:ORE");
    }
}
