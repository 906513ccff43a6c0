//! Request/response surface of the variant engine
//!
//! [`VariantSelector`] wires the store, the snapshot index and the three
//! engine components together and exposes them as JSON-shaped calls. The
//! transport is left to the caller; `varsel rpc` drives [`VariantSelector::handle`]
//! over stdin/stdout.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::core::config::CacheConfig;
use crate::core::error::{CatalogError, CatalogResult};
use crate::core::identity::{TemplateId, VariantId};
use crate::engine::{
    AttributeCatalog, AttributeFilters, AttributeOptions, MultiAttributeQuery, Narrowing,
    NarrowingEngine, Selection, VariantIndex,
};
use crate::store::CatalogStore;

pub struct VariantSelector {
    store: Arc<dyn CatalogStore>,
    index: Arc<VariantIndex>,
    catalog: AttributeCatalog,
    engine: NarrowingEngine,
    query: MultiAttributeQuery,
}

impl VariantSelector {
    pub fn new(store: Arc<dyn CatalogStore>, cache: &CacheConfig) -> Self {
        let index = Arc::new(VariantIndex::new(Arc::clone(&store), cache));
        Self {
            catalog: AttributeCatalog::new(Arc::clone(&store), Arc::clone(&index)),
            engine: NarrowingEngine::new(Arc::clone(&index)),
            query: MultiAttributeQuery::new(Arc::clone(&store)),
            store,
            index,
        }
    }

    /// The shared snapshot index
    pub fn index(&self) -> &VariantIndex {
        &self.index
    }

    /// All templates known to the store
    pub fn templates(&self) -> CatalogResult<Vec<TemplateId>> {
        Ok(self.store.templates()?)
    }

    /// Attributes of a template with the values worth offering
    pub fn get_attributes_and_values(
        &self,
        item_code: &TemplateId,
    ) -> CatalogResult<Vec<AttributeOptions>> {
        self.catalog.attributes_and_values(item_code)
    }

    /// The variant a selection identifies exactly, if any
    pub fn get_next_attribute_and_values(
        &self,
        item_code: &TemplateId,
        selected_attributes: &Value,
    ) -> CatalogResult<Option<VariantId>> {
        Ok(self.narrow(item_code, selected_attributes)?.exact_match)
    }

    /// Full narrowing step including reachable values
    pub fn narrow(&self, item_code: &TemplateId, selected_attributes: &Value) -> CatalogResult<Narrowing> {
        let selection = Selection::from_json(selected_attributes)?;
        self.narrow_selection(item_code, &selection)
    }

    /// Narrowing step for an already-parsed selection
    pub fn narrow_selection(&self, item_code: &TemplateId, selection: &Selection) -> CatalogResult<Narrowing> {
        self.engine.next(item_code, selection)
    }

    /// Item codes matching the filters, sorted
    pub fn get_item_codes_by_attributes(
        &self,
        attribute_filters: &Value,
        template_item_code: Option<&TemplateId>,
    ) -> CatalogResult<Vec<VariantId>> {
        let filters = AttributeFilters::from_json(attribute_filters)?;
        self.match_filters(&filters, template_item_code)
    }

    /// Item codes matching already-parsed filters, sorted
    pub fn match_filters(
        &self,
        filters: &AttributeFilters,
        template_item_code: Option<&TemplateId>,
    ) -> CatalogResult<Vec<VariantId>> {
        Ok(self
            .query
            .matches(filters, template_item_code)?
            .into_iter()
            .collect())
    }

    /// Drop the cached snapshot of one template
    pub fn invalidate(&self, item_code: &TemplateId) {
        self.index.invalidate(item_code);
    }

    /// Drop every cached snapshot
    pub fn clear_cache(&self) {
        self.index.clear();
    }

    /// Dispatch one RPC request
    pub fn handle(&self, request: RpcRequest) -> RpcResponse {
        let id = request.id.clone();
        match self.dispatch(&request.method, request.params) {
            Ok(result) => RpcResponse::ok(id, result),
            Err(err) => RpcResponse::err(id, err),
        }
    }

    fn dispatch(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        match method {
            "get_attributes_and_values" => {
                let p: TemplateParams = parse_params(params)?;
                to_value(self.get_attributes_and_values(&p.item_code)?)
            }
            "get_next_attribute_and_values" => {
                let p: SelectionParams = parse_params(params)?;
                to_value(self.get_next_attribute_and_values(&p.item_code, &p.selected_attributes)?)
            }
            "narrow" => {
                let p: SelectionParams = parse_params(params)?;
                to_value(self.narrow(&p.item_code, &p.selected_attributes)?)
            }
            "get_item_codes_by_attributes" => {
                let p: FilterParams = parse_params(params)?;
                to_value(self.get_item_codes_by_attributes(
                    &p.attribute_filters,
                    p.template_item_code.as_ref(),
                )?)
            }
            "invalidate" => {
                let p: TemplateParams = parse_params(params)?;
                self.invalidate(&p.item_code);
                Ok(Value::Bool(true))
            }
            "clear_cache" => {
                self.clear_cache();
                Ok(Value::Bool(true))
            }
            "templates" => to_value(self.templates()?),
            other => Err(RpcError::new(
                "unknown_method",
                format!("unknown method: {}", other),
            )),
        }
    }
}

#[derive(Deserialize)]
struct TemplateParams {
    item_code: TemplateId,
}

#[derive(Deserialize)]
struct SelectionParams {
    item_code: TemplateId,
    #[serde(default)]
    selected_attributes: Value,
}

#[derive(Deserialize)]
struct FilterParams {
    attribute_filters: Value,
    #[serde(default)]
    template_item_code: Option<TemplateId>,
}

fn parse_params<T: serde::de::DeserializeOwned>(params: Value) -> Result<T, RpcError> {
    let params = if params.is_null() {
        Value::Object(Default::default())
    } else {
        params
    };
    serde_json::from_value(params).map_err(|e| RpcError::new("invalid_params", e.to_string()))
}

fn to_value<T: Serialize>(value: T) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(|e| RpcError::new("internal", e.to_string()))
}

/// One call: `{"id": .., "method": .., "params": {..}}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// Error half of an [`RpcResponse`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RpcError {
    pub kind: String,
    pub message: String,
}

impl RpcError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

impl From<CatalogError> for RpcError {
    fn from(err: CatalogError) -> Self {
        RpcError::new(err.kind(), err.to_string())
    }
}

/// Reply to an [`RpcRequest`]; exactly one of `result` and `error` is set
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RpcResponse {
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn ok(id: Value, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(id: Value, error: impl Into<RpcError>) -> Self {
        Self {
            id,
            result: None,
            error: Some(error.into()),
        }
    }
}
