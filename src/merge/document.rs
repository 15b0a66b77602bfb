//! Page-addressable documents used by the merge pipeline.
//!
//! [`SourceDocument`] is a decoded input, [`OutputDocument`] is the single
//! document being assembled. Pages move between them in two steps, mirroring
//! the usual copy-then-append contract of PDF libraries:
//!
//! 1. [`OutputDocument::copy_pages`] imports the requested pages (and every
//!    object they reference) into the output's object space and returns one
//!    [`PageHandle`] per page.
//! 2. [`OutputDocument::add_page`] appends a handle to the page tree.
//!
//! Copied pages are detached from their source page tree, so attributes a
//! page inherits from its ancestors are resolved onto the page itself.

use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};
use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{MergeError, Result};
use crate::input::InputFile;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

static NEXT_SPACE: AtomicU64 = AtomicU64::new(1);

/// A decoded input document.
#[derive(Debug)]
pub struct SourceDocument {
    document: Document,
    pages: Vec<ObjectId>,
}

impl SourceDocument {
    /// Decode raw bytes into a page-addressable document.
    pub fn decode(bytes: &[u8]) -> std::result::Result<Self, lopdf::Error> {
        let document = Document::load_mem(bytes)?;
        Ok(Self::from_document(document))
    }

    /// Decode the `index`-th input of a merge.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Encrypted`] for encrypted documents and
    /// [`MergeError::Decode`] for anything the parser rejects.
    pub fn from_input(index: usize, input: &InputFile) -> Result<Self> {
        let source =
            Self::decode(input.bytes()).map_err(|err| decode_error(index, input, err))?;

        // lopdf loads documents it cannot decrypt and only logs a warning.
        if source.document.is_encrypted() {
            return Err(MergeError::Encrypted {
                index,
                name: input.name().to_string(),
            });
        }

        Ok(source)
    }

    /// Wrap an already parsed document.
    pub fn from_document(document: Document) -> Self {
        let pages = document.get_pages().into_values().collect();
        Self { document, pages }
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page indices in their original order.
    pub fn page_indices(&self) -> Range<usize> {
        0..self.pages.len()
    }

    /// PDF header version of the source.
    pub fn version(&self) -> &str {
        &self.document.version
    }
}

/// A page copied into an [`OutputDocument`] but not yet placed in its page tree.
///
/// A handle is only valid for the document it was copied into.
#[derive(Debug)]
#[must_use = "a copied page is not part of the document until it is added"]
pub struct PageHandle {
    id: ObjectId,
    space: u64,
}

impl PageHandle {
    /// Object id of the page inside the output document.
    pub fn object_id(&self) -> ObjectId {
        self.id
    }
}

/// The document a merge appends pages to.
#[derive(Debug)]
pub struct OutputDocument {
    document: Document,
    pages_id: ObjectId,
    space: u64,
}

impl OutputDocument {
    /// Create an empty document with the given header version.
    pub fn new(version: &str) -> Self {
        let mut document = Document::with_version(version);

        let pages_id = document.new_object_id();
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => Object::Integer(0),
            }),
        );

        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        Self {
            document,
            pages_id,
            space: NEXT_SPACE.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Number of pages placed in the page tree so far.
    pub fn page_count(&self) -> usize {
        self.document
            .get_dictionary(self.pages_id)
            .and_then(|pages| pages.get(b"Kids"))
            .and_then(Object::as_array)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Copy pages of `source` into this document's object space.
    ///
    /// Handles are returned in the order of `indices`. Objects shared by
    /// several of the copied pages (fonts, images) are imported once. An
    /// index listed more than once yields a separate page object each time.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::PageNotFound`] if an index is out of range, in
    /// which case nothing has been copied.
    pub fn copy_pages(
        &mut self,
        source: &SourceDocument,
        indices: &[usize],
    ) -> Result<Vec<PageHandle>> {
        let total = source.page_count();
        if let Some(&page) = indices.iter().find(|&&page| page >= total) {
            return Err(MergeError::PageNotFound { page, total });
        }

        let mut copier = ObjectCopier::new(&source.document, &mut self.document);
        let mut handles = Vec::with_capacity(indices.len());
        for &index in indices {
            let id = copier.copy_page(source.pages[index])?;
            handles.push(PageHandle {
                id,
                space: self.space,
            });
        }

        Ok(handles)
    }

    /// Append a copied page to the end of the page tree.
    pub fn add_page(&mut self, handle: PageHandle) -> Result<()> {
        if handle.space != self.space {
            return Err(MergeError::ForeignPage);
        }

        let pages_id = self.pages_id;
        self.document
            .get_dictionary_mut(handle.id)
            .map_err(|e| MergeError::assemble(format!("Failed to get copied page: {e}")))?
            .set("Parent", pages_id);

        let pages = self
            .document
            .get_dictionary_mut(pages_id)
            .map_err(|e| MergeError::assemble(format!("Failed to get pages object: {e}")))?;

        let kids = pages
            .get_mut(b"Kids")
            .and_then(Object::as_array_mut)
            .map_err(|_| MergeError::assemble("Pages dictionary missing Kids array"))?;
        kids.push(Object::Reference(handle.id));
        let count = kids.len() as i64;

        pages.set("Count", Object::Integer(count));
        Ok(())
    }

    /// Serialize the document.
    pub fn save(mut self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.document
            .save_to(&mut buffer)
            .map_err(|e| MergeError::encode(e.to_string()))?;
        Ok(buffer)
    }
}

/// Imports objects from one document into another, remapping object ids.
struct ObjectCopier<'a> {
    source: &'a Document,
    target: &'a mut Document,
    mapped: HashMap<ObjectId, ObjectId>,
    pages: HashSet<ObjectId>,
}

impl<'a> ObjectCopier<'a> {
    fn new(source: &'a Document, target: &'a mut Document) -> Self {
        Self {
            source,
            target,
            mapped: HashMap::new(),
            pages: HashSet::new(),
        }
    }

    fn copy_page(&mut self, page_id: ObjectId) -> Result<ObjectId> {
        let source = self.source;
        let original = source
            .get_dictionary(page_id)
            .map_err(|e| MergeError::assemble(format!("Failed to get source page: {e}")))?;

        let mut page = original.clone();
        for key in INHERITABLE_KEYS {
            if !page.has(key)
                && let Some(value) = inherited_attribute(source, original, key)
            {
                page.set(key.to_vec(), value.clone());
            }
        }
        page.remove(b"Parent");

        // A page tree may only list an object once.
        if !self.pages.insert(page_id) {
            self.mapped.remove(&page_id);
        }

        // Register the page before walking it so back-references (annotation
        // /P entries) resolve to the copy.
        let id = self.reserve(page_id);
        let copied = self.copy_dictionary(&page);
        self.target.objects.insert(id, Object::Dictionary(copied));
        Ok(id)
    }

    fn reserve(&mut self, source_id: ObjectId) -> ObjectId {
        if let Some(&id) = self.mapped.get(&source_id) {
            return id;
        }
        let id = self.target.new_object_id();
        self.mapped.insert(source_id, id);
        id
    }

    fn copy_reference(&mut self, source_id: ObjectId) -> ObjectId {
        if let Some(&id) = self.mapped.get(&source_id) {
            return id;
        }

        let id = self.reserve(source_id);
        let source = self.source;
        let copied = match source.get_object(source_id) {
            Ok(object) => self.copy_object(object),
            Err(_) => Object::Null,
        };
        self.target.objects.insert(id, copied);
        id
    }

    fn copy_object(&mut self, object: &Object) -> Object {
        match object {
            Object::Reference(id) => Object::Reference(self.copy_reference(*id)),
            Object::Array(items) => {
                Object::Array(items.iter().map(|item| self.copy_object(item)).collect())
            }
            Object::Dictionary(dict) => Object::Dictionary(self.copy_dictionary(dict)),
            Object::Stream(stream) => {
                let mut stream = stream.clone();
                stream.dict = self.copy_dictionary(&stream.dict);
                Object::Stream(stream)
            }
            other => other.clone(),
        }
    }

    fn copy_dictionary(&mut self, dict: &Dictionary) -> Dictionary {
        // Page tree nodes reached through references (e.g. link destinations)
        // must not drag their source tree along.
        let tree_node = dict
            .get(b"Type")
            .and_then(Object::as_name)
            .is_ok_and(|name| name == b"Page" || name == b"Pages");

        let mut copied = Dictionary::new();
        for (key, value) in dict.iter() {
            if tree_node && key.as_slice() == b"Parent" {
                continue;
            }
            copied.set(key.clone(), self.copy_object(value));
        }
        copied
    }
}

fn decode_error(index: usize, input: &InputFile, err: lopdf::Error) -> MergeError {
    match err {
        lopdf::Error::Decryption(_) | lopdf::Error::UnsupportedSecurityHandler(_) => {
            MergeError::Encrypted {
                index,
                name: input.name().to_string(),
            }
        }
        other => MergeError::decode(index, input.name(), other.to_string()),
    }
}

/// Look up `key` on the ancestors of `page`, nearest first.
fn inherited_attribute<'a>(doc: &'a Document, page: &Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut seen = HashSet::new();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    while let Some(id) = parent {
        if !seen.insert(id) {
            break;
        }
        let node = doc.get_dictionary(id).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    None
}
