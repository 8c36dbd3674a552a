//! Entity module - Contains all SeaORM entity definitions for the database.
//!
//! The visit tree is one table per level, each keyed by its parent id:
//! visits → `visit_services` → bowls → `material_lines`, with `visit_products` as a
//! sibling of services. Walk-in sales live outside the tree in `product_sales` →
//! `product_sale_lines`. Catalog tables are scoped by `owner_id`.

pub mod bowl;
pub mod client;
pub mod material;
pub mod material_line;
pub mod material_ratio;
pub mod oxidant;
pub mod product;
pub mod product_sale;
pub mod product_sale_line;
pub mod service_template;
pub mod visit;
pub mod visit_product;
pub mod visit_service;

// Re-export specific types to avoid conflicts
pub use bowl::{Column as BowlColumn, Entity as Bowl, Model as BowlModel};
pub use client::{Column as ClientColumn, Entity as Client, Model as ClientModel};
pub use material::{Column as MaterialColumn, Entity as Material, Model as MaterialModel};
pub use material_line::{
    Column as MaterialLineColumn, Entity as MaterialLine, Model as MaterialLineModel,
};
pub use material_ratio::{
    Column as MaterialRatioColumn, Entity as MaterialRatio, Model as MaterialRatioModel,
};
pub use oxidant::{Column as OxidantColumn, Entity as Oxidant, Model as OxidantModel};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use product_sale::{
    Column as ProductSaleColumn, Entity as ProductSale, Model as ProductSaleModel,
};
pub use product_sale_line::{
    Column as ProductSaleLineColumn, Entity as ProductSaleLine, Model as ProductSaleLineModel,
};
pub use service_template::{
    Column as ServiceTemplateColumn, Entity as ServiceTemplate, Model as ServiceTemplateModel,
};
pub use visit::{Column as VisitColumn, Entity as Visit, Model as VisitModel};
pub use visit_product::{
    Column as VisitProductColumn, Entity as VisitProduct, Model as VisitProductModel,
};
pub use visit_service::{
    Column as VisitServiceColumn, Entity as VisitService, Model as VisitServiceModel,
};
