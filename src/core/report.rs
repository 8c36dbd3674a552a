//! Revenue reporting.
//!
//! This module provides the daily cash-register reconciliation and the monthly
//! and yearly revenue breakdowns. Both visits and walk-in product sales are
//! counted: a sale adds to product revenue and to the register of its payment
//! method. All functions read stored rows and return plain data; formatting is
//! left to the caller apart from [`format_amount`].

use crate::{
    core::visit::PaymentMethod,
    entities::{ProductSale, Visit, product_sale, visit},
    errors::{Error, Result},
};
use chrono::{Datelike, NaiveDate};
use sea_orm::{QueryOrder, prelude::*};
use serde::Serialize;
use std::collections::BTreeMap;

/// Totals of one payment method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PaymentTotal {
    /// Number of visits and sales
    pub count: usize,
    /// Sum of their totals
    pub amount: f64,
}

impl PaymentTotal {
    fn add(&mut self, amount: f64) {
        self.count += 1;
        self.amount += amount;
    }
}

/// Cash register state for one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRegister {
    /// Day reported on
    pub date: NaiveDate,
    /// Visits and sales paid in cash
    pub cash: PaymentTotal,
    /// Visits and sales paid by QR transfer
    pub qr: PaymentTotal,
    /// Visits of the day with no payment method recorded; not in either sum
    pub unassigned: Vec<visit::Model>,
    /// Sales of the day with no payment method recorded; not in either sum
    pub unassigned_sales: Vec<product_sale::Model>,
}

impl DailyRegister {
    /// Cash plus QR.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.cash.amount + self.qr.amount
    }

    fn total_for(&mut self, method: PaymentMethod) -> &mut PaymentTotal {
        match method {
            PaymentMethod::Cash => &mut self.cash,
            PaymentMethod::Qr => &mut self.qr,
        }
    }
}

/// Revenue of one month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    /// Month number, 1 to 12
    pub month: u32,
    /// Visits in the month
    pub visit_count: usize,
    /// Walk-in sales in the month
    pub sale_count: usize,
    /// Sum of services amounts
    pub services: f64,
    /// Products sold during visits plus walk-in sales
    pub products: f64,
    /// Sum of visit and sale totals
    pub total: f64,
}

/// Revenue of one year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct YearlyRevenue {
    /// Calendar year
    pub year: i32,
    /// Visits in the year
    pub visit_count: usize,
    /// Walk-in sales in the year
    pub sale_count: usize,
    /// Sum of services amounts
    pub services: f64,
    /// Products sold during visits plus walk-in sales
    pub products: f64,
    /// Sum of visit and sale totals
    pub total: f64,
}

trait Accumulate {
    fn add_visit(&mut self, visit: &visit::Model);
    fn add_sale(&mut self, sale: &product_sale::Model);
}

impl Accumulate for MonthlyRevenue {
    fn add_visit(&mut self, visit: &visit::Model) {
        self.visit_count += 1;
        self.services += visit.services_amount.unwrap_or(0.0);
        self.products += visit.products_amount.unwrap_or(0.0);
        self.total += visit.total_amount.unwrap_or(0.0);
    }

    fn add_sale(&mut self, sale: &product_sale::Model) {
        self.sale_count += 1;
        self.products += sale.total_amount;
        self.total += sale.total_amount;
    }
}

impl Accumulate for YearlyRevenue {
    fn add_visit(&mut self, visit: &visit::Model) {
        self.visit_count += 1;
        self.services += visit.services_amount.unwrap_or(0.0);
        self.products += visit.products_amount.unwrap_or(0.0);
        self.total += visit.total_amount.unwrap_or(0.0);
    }

    fn add_sale(&mut self, sale: &product_sale::Model) {
        self.sale_count += 1;
        self.products += sale.total_amount;
        self.total += sale.total_amount;
    }
}

async fn visits_between(
    db: &DatabaseConnection,
    owner_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<visit::Model>> {
    Visit::find()
        .filter(visit::Column::OwnerId.eq(owner_id))
        .filter(visit::Column::Date.between(from, to))
        .order_by_asc(visit::Column::Date)
        .order_by_asc(visit::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn sales_between(
    db: &DatabaseConnection,
    owner_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<product_sale::Model>> {
    ProductSale::find()
        .filter(product_sale::Column::OwnerId.eq(owner_id))
        .filter(product_sale::Column::Date.between(from, to))
        .order_by_asc(product_sale::Column::Date)
        .order_by_asc(product_sale::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

fn parse_method(stored: Option<&str>) -> Result<Option<PaymentMethod>> {
    stored.map(PaymentMethod::parse).transpose()
}

/// Reconciles the register for one day.
///
/// # Errors
/// Returns an error if a query fails or a stored payment method is unknown.
pub async fn daily_register(
    db: &DatabaseConnection,
    owner_id: &str,
    date: NaiveDate,
) -> Result<DailyRegister> {
    let mut register = DailyRegister {
        date,
        cash: PaymentTotal::default(),
        qr: PaymentTotal::default(),
        unassigned: Vec::new(),
        unassigned_sales: Vec::new(),
    };

    for visit in visits_between(db, owner_id, date, date).await? {
        let amount = visit.total_amount.unwrap_or(0.0);
        match parse_method(visit.payment_method.as_deref())? {
            Some(method) => register.total_for(method).add(amount),
            None => register.unassigned.push(visit),
        }
    }

    for sale in sales_between(db, owner_id, date, date).await? {
        match parse_method(sale.payment_method.as_deref())? {
            Some(method) => register.total_for(method).add(sale.total_amount),
            None => register.unassigned_sales.push(sale),
        }
    }

    Ok(register)
}

/// Revenue per month of `year`, always twelve entries.
///
/// # Errors
/// Returns an error if the year is out of range or a query fails.
pub async fn monthly_revenue(
    db: &DatabaseConnection,
    owner_id: &str,
    year: i32,
) -> Result<Vec<MonthlyRevenue>> {
    let (from, to) = NaiveDate::from_ymd_opt(year, 1, 1)
        .zip(NaiveDate::from_ymd_opt(year, 12, 31))
        .ok_or_else(|| Error::InvalidInput {
            message: format!("Year {year} is out of range"),
        })?;

    let mut months: Vec<MonthlyRevenue> = (1..=12)
        .map(|month| MonthlyRevenue {
            month,
            ..MonthlyRevenue::default()
        })
        .collect();

    for visit in visits_between(db, owner_id, from, to).await? {
        let index = usize::try_from(visit.date.month0())?;
        months[index].add_visit(&visit);
    }
    for sale in sales_between(db, owner_id, from, to).await? {
        let index = usize::try_from(sale.date.month0())?;
        months[index].add_sale(&sale);
    }

    Ok(months)
}

/// Revenue per year with at least one visit or sale, newest year first.
///
/// # Errors
/// Returns an error if a query fails.
pub async fn yearly_revenue(db: &DatabaseConnection, owner_id: &str) -> Result<Vec<YearlyRevenue>> {
    let visits = Visit::find()
        .filter(visit::Column::OwnerId.eq(owner_id))
        .all(db)
        .await?;
    let sales = ProductSale::find()
        .filter(product_sale::Column::OwnerId.eq(owner_id))
        .all(db)
        .await?;

    let mut years: BTreeMap<i32, YearlyRevenue> = BTreeMap::new();
    let blank = |year| YearlyRevenue {
        year,
        ..YearlyRevenue::default()
    };
    for visit in &visits {
        let year = visit.date.year();
        years.entry(year).or_insert_with(|| blank(year)).add_visit(visit);
    }
    for sale in &sales {
        let year = sale.date.year();
        years.entry(year).or_insert_with(|| blank(year)).add_sale(sale);
    }

    Ok(years.into_values().rev().collect())
}

/// Formats an amount in whole crowns with a space between thousands,
/// e.g. `1 250 Kč`.
#[must_use]
pub fn format_amount(amount: f64) -> String {
    let rounded = format!("{:.0}", amount.abs());
    let mut grouped = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (index, digit) in rounded.chars().enumerate() {
        if index > 0 && (rounded.len() - index) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(digit);
    }

    if amount < 0.0 && rounded != "0" {
        format!("-{grouped} Kč")
    } else {
        format!("{grouped} Kč")
    }
}
