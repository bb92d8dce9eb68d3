use api_types::{
    Record, RecordFilter,
    expense::Expense,
    production::Production,
    sale::Sale,
};
use engine::Validate;
use uuid::Uuid;

use super::Notice;
use crate::{
    error::ViewError,
    store::{ClientResult, RecordStore},
};

/// Per-collection wording of a records view.
pub trait Listed: Record<New: Validate> {
    const TITLE: &'static str;
    const SAVED: &'static str;
}

impl Listed for Production {
    const TITLE: &'static str = "Produção";
    const SAVED: &'static str = "Produção registrada com sucesso";
}

impl Listed for Sale {
    const TITLE: &'static str = "Vendas";
    const SAVED: &'static str = "Venda registrada com sucesso";
}

impl Listed for Expense {
    const TITLE: &'static str = "Despesas";
    const SAVED: &'static str = "Despesa registrada com sucesso";
}

/// List of one collection plus its form actions.
///
/// The list only changes after the store confirms: a failed write leaves it
/// untouched, a failed load keeps what was rendered before.
#[derive(Debug)]
pub struct RecordsView<R> {
    records: Vec<R>,
    filter: RecordFilter,
    busy: bool,
    notice: Option<Notice>,
}

impl<R> Default for RecordsView<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            filter: RecordFilter::default(),
            busy: false,
            notice: None,
        }
    }
}

impl<R: Listed> RecordsView<R>
where
    R::New: Validate,
{
    pub fn new(filter: RecordFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// `true` while a request is outstanding; the triggering control is
    /// disabled.
    pub fn busy(&self) -> bool {
        self.busy
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    fn begin(&mut self) -> Result<(), ViewError> {
        if self.busy {
            return Err(ViewError::Busy);
        }
        self.busy = true;
        Ok(())
    }

    /// Marks the view busy and hands out the filter to fetch with.
    pub fn begin_load(&mut self) -> Result<RecordFilter, ViewError> {
        self.begin()?;
        Ok(self.filter)
    }

    pub fn finish_load(&mut self, result: ClientResult<Vec<R>>) -> Result<(), ViewError> {
        self.busy = false;
        match result {
            Ok(records) => {
                self.records = records;
                Ok(())
            }
            Err(err) => {
                let err = ViewError::from(err);
                tracing::warn!("failed to load {}: {err}", R::COLLECTION);
                self.notice = Some(Notice::error("Erro ao carregar dados", err.to_string()));
                Err(err)
            }
        }
    }

    pub async fn load<S: RecordStore>(&mut self, store: &S) -> Result<(), ViewError> {
        let filter = self.begin_load()?;
        let result = store.list::<R>(&filter).await;
        self.finish_load(result)
    }

    /// Normalizes and validates `new`. Only a valid form marks the view busy.
    pub fn begin_submit(&mut self, new: R::New) -> Result<R::New, ViewError> {
        if self.busy {
            return Err(ViewError::Busy);
        }
        let new = new.normalized();
        if let Err(err) = new.validate() {
            let err = ViewError::from(err);
            self.notice = Some(Notice::error("Erro", err.to_string()));
            return Err(err);
        }
        self.busy = true;
        Ok(new)
    }

    /// The stored record is prepended.
    pub fn finish_submit(&mut self, result: ClientResult<R>) -> Result<R, ViewError> {
        self.busy = false;
        match result {
            Ok(record) => {
                self.records.insert(0, record.clone());
                self.notice = Some(Notice::success("Sucesso", R::SAVED));
                Ok(record)
            }
            Err(err) => {
                let err = ViewError::from(err);
                self.notice = Some(Notice::error("Erro", err.to_string()));
                Err(err)
            }
        }
    }

    pub async fn submit<S: RecordStore>(&mut self, store: &S, new: R::New) -> Result<R, ViewError> {
        let new = self.begin_submit(new)?;
        let result = store.insert::<R>(&new).await;
        self.finish_submit(result)
    }

    pub fn begin_remove(&mut self) -> Result<(), ViewError> {
        self.begin()
    }

    pub fn finish_remove(&mut self, id: Uuid, result: ClientResult<()>) -> Result<(), ViewError> {
        self.busy = false;
        match result {
            Ok(()) => {
                self.records.retain(|record| record.id() != id);
                self.notice = Some(Notice::success("Sucesso", "Registro excluído com sucesso"));
                Ok(())
            }
            Err(err) => {
                let err = ViewError::from(err);
                self.notice = Some(Notice::error("Erro ao excluir", err.to_string()));
                Err(err)
            }
        }
    }

    pub async fn remove<S: RecordStore>(&mut self, store: &S, id: Uuid) -> Result<(), ViewError> {
        self.begin_remove()?;
        let result = store.delete::<R>(id).await;
        self.finish_remove(id, result)
    }
}
