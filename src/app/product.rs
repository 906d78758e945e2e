// SPDX-License-Identifier: GPL-3.0-only

//! Product screen state
//!
//! Combines the lookup for the code in the current route with the
//! expand/collapse flags of the detail sections.

use crate::app::display::ProductDisplay;
use crate::app::scan::ProductCode;
use crate::catalog::{CatalogClient, LookupFailure, LookupState, ProductLookup};
use crate::errors::{AppError, AppResult};
use crate::navigation::{Navigator, PRODUCT_ID_PARAM};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Collapsible sections of the product screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Nutrition,
    /// Flag only; nothing is shown under it
    Ingredients,
    Environmental,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Nutrition, Section::Ingredients, Section::Environmental];
}

/// Expanded flag per section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionExpansion {
    pub nutrition: bool,
    pub ingredients: bool,
    pub environmental: bool,
}

impl Default for SectionExpansion {
    fn default() -> Self {
        Self {
            nutrition: true,
            ingredients: false,
            environmental: false,
        }
    }
}

impl SectionExpansion {
    pub fn is_expanded(&self, section: Section) -> bool {
        match section {
            Section::Nutrition => self.nutrition,
            Section::Ingredients => self.ingredients,
            Section::Environmental => self.environmental,
        }
    }

    /// Flip one section, leaving the others alone
    pub fn toggle(&mut self, section: Section) {
        let flag = match section {
            Section::Nutrition => &mut self.nutrition,
            Section::Ingredients => &mut self.ingredients,
            Section::Environmental => &mut self.environmental,
        };
        *flag = !*flag;
    }
}

/// What the product screen shows right now
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ProductView {
    Loading {
        message: &'static str,
    },
    Error {
        message: &'static str,
        /// Label of the retry action
        retry: &'static str,
        #[serde(skip)]
        reason: LookupFailure,
    },
    Ready {
        product: Box<ProductDisplay>,
        sections: SectionExpansion,
    },
}

/// Product screen for the code in the current route
#[derive(Debug)]
pub struct ProductScreen<C> {
    lookup: ProductLookup<C>,
    sections: SectionExpansion,
}

impl<C: CatalogClient> ProductScreen<C> {
    /// Mount on the current route, reading the product code from its `id` parameter
    pub fn mount(nav: &impl Navigator, catalog: Arc<C>) -> AppResult<Self> {
        let raw = nav.current_path_param(PRODUCT_ID_PARAM).ok_or_else(|| {
            AppError::Navigation("product screen opened without a product id".to_string())
        })?;
        let code = ProductCode::new(&raw)
            .ok_or_else(|| AppError::Navigation("empty product id".to_string()))?;
        Ok(Self::new(catalog, code))
    }

    pub fn new(catalog: Arc<C>, code: ProductCode) -> Self {
        info!(code = %code, "Product screen mounted");
        Self {
            lookup: ProductLookup::new(catalog, code),
            sections: SectionExpansion::default(),
        }
    }

    /// Load the product; later calls keep the first result
    pub async fn load(&mut self) -> &LookupState {
        self.lookup.fetch().await
    }

    /// "Try Again"
    pub async fn retry(&mut self) -> &LookupState {
        self.lookup.retry().await
    }

    pub fn toggle_section(&mut self, section: Section) {
        self.sections.toggle(section);
    }

    pub fn sections(&self) -> SectionExpansion {
        self.sections
    }

    pub fn state(&self) -> &LookupState {
        self.lookup.state()
    }

    pub fn lookup_mut(&mut self) -> &mut ProductLookup<C> {
        &mut self.lookup
    }

    /// Leave the screen; any result still in flight is discarded
    pub fn unmount(&mut self) {
        self.lookup.unmount();
    }

    pub fn view(&self) -> ProductView {
        match self.lookup.state() {
            LookupState::Loading => ProductView::Loading {
                message: "Loading product data...",
            },
            LookupState::Error(reason) => ProductView::Error {
                message: reason.message(),
                retry: "Try Again",
                reason: *reason,
            },
            LookupState::Ready(product) => ProductView::Ready {
                product: Box::new(ProductDisplay::from_product(product)),
                sections: self.sections,
            },
        }
    }
}
