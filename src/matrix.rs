//! Embedding matrix assembly.
//!
//! Collects every book that carries a decodable embedding and stacks the
//! vectors into a dense N×D matrix, keeping a parallel list of book ids so
//! row `i` always corresponds to `book_ids[i]`. The matrix is rebuilt from
//! scratch on every triggering call and never persisted.
//!
//! Malformed rows are a fact of life here (the embedding column is opaque
//! text written by an external producer), so the builder skips and logs
//! rather than failing the batch: a book whose embedding does not decode, or
//! whose dimension disagrees with the first successfully decoded vector, is
//! dropped with a `warn!`. Only the all-rows-unusable case is an error.

use log::warn;
use ndarray::Array2;

use crate::book::Book;
use crate::error::{Error, Result};

/// Dense embedding matrix plus the aligned book ids.
#[derive(Debug, Clone)]
pub struct EmbeddingMatrix {
    /// N×D matrix, one row per embedded book.
    pub matrix: Array2<f32>,
    /// Book ids aligned with the matrix rows.
    pub book_ids: Vec<String>,
}

impl EmbeddingMatrix {
    /// Number of embedded books (matrix rows).
    pub fn n_books(&self) -> usize {
        self.matrix.nrows()
    }

    /// Embedding dimensionality (matrix columns).
    pub fn dim(&self) -> usize {
        self.matrix.ncols()
    }
}

/// Build the embedding matrix from a book snapshot.
///
/// The first successfully decoded vector fixes the expected dimension D;
/// later vectors of any other length are skipped. Returns
/// [`Error::EmptyInput`] when zero books end up usable.
pub fn build_embedding_matrix(books: &[Book]) -> Result<EmbeddingMatrix> {
    let mut dim: Option<usize> = None;
    let mut flat: Vec<f32> = Vec::new();
    let mut book_ids: Vec<String> = Vec::new();

    for book in books {
        if book.embedding.is_none() {
            continue;
        }

        let Some(vector) = book.decoded_embedding() else {
            warn!("skipping book {}: embedding does not decode", book.id);
            continue;
        };

        match dim {
            None => {
                if vector.is_empty() {
                    warn!("skipping book {}: empty embedding vector", book.id);
                    continue;
                }
                dim = Some(vector.len());
            }
            Some(d) if vector.len() != d => {
                warn!(
                    "skipping book {}: embedding dimension {} != {}",
                    book.id,
                    vector.len(),
                    d
                );
                continue;
            }
            Some(_) => {}
        }

        flat.extend_from_slice(&vector);
        book_ids.push(book.id.clone());
    }

    let Some(d) = dim else {
        return Err(Error::EmptyInput);
    };

    let matrix = Array2::from_shape_vec((book_ids.len(), d), flat)
        .map_err(|e| Error::Other(e.to_string()))?;

    Ok(EmbeddingMatrix { matrix, book_ids })
}
