use tracing::debug;

use super::AclBackend;
use crate::document::{document_id, EntryDocument, KEY_FIELD};
use crate::error::BackendError;
use crate::query::TermsQuery;
use crate::store::DocumentStore;
use crate::transaction::{Command, Transaction};
use crate::value::{normalize, EntryKey, OneOrMany};

impl<S: DocumentStore> AclBackend<S> {
    /// Stage adding `values` to the set owned by `key`.
    ///
    /// Values already in the set are left alone when the transaction runs.
    /// The reserved key `"key"` is refused here, before anything is staged.
    pub fn add<V>(
        &self,
        transaction: &mut Transaction,
        bucket: &str,
        key: impl Into<EntryKey>,
        values: &[V],
    ) -> Result<(), BackendError<S::Error>>
    where
        V: AsRef<str>,
    {
        let key = key.into();
        if key.is_reserved() {
            return Err(BackendError::ReservedKey);
        }
        let collection = self.collection(bucket)?;

        let documents = owned(values)
            .into_iter()
            .map(|value| EntryDocument::new(key.clone(), value))
            .collect::<Vec<_>>();
        debug!(%collection, %key, count = documents.len(), "staging add");

        transaction.push(Command::CreateDocs {
            collection,
            documents,
        });
        Ok(())
    }

    /// Stage removing `values` from the set owned by `key`.
    ///
    /// Values that are not in the set are ignored when the transaction runs.
    pub fn remove<V>(
        &self,
        transaction: &mut Transaction,
        bucket: &str,
        key: impl Into<EntryKey>,
        values: &[V],
    ) -> Result<(), BackendError<S::Error>>
    where
        V: AsRef<str>,
    {
        let key = key.into();
        let collection = self.collection(bucket)?;

        let ids = owned(values)
            .iter()
            .map(|value| document_id(&key, value))
            .collect::<Vec<_>>();
        debug!(%collection, %key, count = ids.len(), "staging remove");

        transaction.push(Command::DeleteDocs { collection, ids });
        Ok(())
    }

    /// Stage deleting the whole sets owned by `keys`.
    ///
    /// With no keys the staged command is a no-op that never reaches the
    /// store.
    pub fn del<K>(
        &self,
        transaction: &mut Transaction,
        bucket: &str,
        keys: &[K],
    ) -> Result<(), BackendError<S::Error>>
    where
        K: Clone + Into<EntryKey>,
    {
        let collection = self.collection(bucket)?;
        let keys = keys.iter().cloned().map(Into::into).collect::<Vec<EntryKey>>();
        let query = TermsQuery::new(KEY_FIELD, OneOrMany::Many(keys));
        debug!(%collection, count = query.values().len(), "staging del");

        transaction.push(Command::DeleteByQuery { collection, query });
        Ok(())
    }
}

fn owned<V: AsRef<str>>(values: &[V]) -> Vec<String> {
    normalize(OneOrMany::Many(
        values.iter().map(|v| v.as_ref().to_owned()).collect(),
    ))
}
