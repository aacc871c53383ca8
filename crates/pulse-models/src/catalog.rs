/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Built-in catalog of trackable instruments.
//!
//! Widget items are rendered by a third-party embed and never fetched;
//! sheet items are self-rendered cards fed from the record cache, and their
//! `name` must match the first column of the fallback sheet.

use serde::{Deserialize, Serialize};

/// How a card is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
  /// Externally embedded chart widget
  #[default]
  #[serde(alias = "")]
  Widget,
  /// Self-rendered card backed by a [`MarketRecord`](crate::MarketRecord)
  Sheet,
}

impl std::fmt::Display for ItemKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ItemKind::Widget => write!(f, "widget"),
      ItemKind::Sheet => write!(f, "sheet"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
  pub id: String,
  pub name: String,
  pub symbol: String,
  #[serde(default, rename = "type")]
  pub kind: ItemKind,
}

impl CatalogItem {
  pub fn widget(id: &str, name: &str, symbol: &str) -> Self {
    CatalogItem { id: id.to_string(), name: name.to_string(), symbol: symbol.to_string(), kind: ItemKind::Widget }
  }

  pub fn sheet(id: &str, name: &str, symbol: &str) -> Self {
    CatalogItem { id: id.to_string(), name: name.to_string(), symbol: symbol.to_string(), kind: ItemKind::Sheet }
  }

  pub fn is_sheet(&self) -> bool {
    self.kind == ItemKind::Sheet
  }
}

/// Ordered list of catalog items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
  items: Vec<CatalogItem>,
}

impl Catalog {
  pub fn from_items(items: Vec<CatalogItem>) -> Self {
    Catalog { items }
  }

  /// The default dashboard instruments
  pub fn builtin() -> Self {
    let items = vec![
      CatalogItem::widget("nas100", "NAS100(CFD)", "FOREXCOM:NAS100"),
      CatalogItem::widget("ni225", "NI225(Future)", "OSE:NK2251!"),
      CatalogItem::widget("us500", "S&P500(CFD)", "US500"),
      CatalogItem::widget("dji", "DJI", "AMEX:DIA"),
      CatalogItem::widget("usdjpy", "USDJPY", "USDJPY"),
      CatalogItem::widget("nvda", "NVDA", "NASDAQ:NVDA"),
      CatalogItem::widget("aapl", "AAPL", "NASDAQ:AAPL"),
      CatalogItem::widget("tsla", "TSLA", "NASDAQ:TSLA"),
      CatalogItem::widget("msft", "MSFT", "NASDAQ:MSFT"),
      CatalogItem::widget("sox", "SOX", "NASDAQ:SOX"),
      CatalogItem::widget("sony", "SONY", "NYSE:SONY"),
      CatalogItem::widget("btc", "BTC", "BINANCE:BTCUSDT"),
      CatalogItem::widget("vix", "VIX(Future)", "CAPITALCOM:VIX"),
      CatalogItem::widget("gold", "GOLD", "TVC:GOLD"),
      CatalogItem::widget("oil", "OIL", "TVC:USOIL"),
      CatalogItem::widget("ni225_cfd", "NI225(CFD)", "FOREXCOM:JP225"),
      CatalogItem::sheet("sheet_sp500", "S&P500", ".INX:INDEXSP"),
      CatalogItem::sheet("sheet_vix", "VIX(Spot)", "VIX:INDEXCBOE"),
      CatalogItem::sheet("sheet_nas100", "NAS100", "NAS100"),
      CatalogItem::sheet("sheet_ni225", "NI225", "NI225:INDEXNIKKEI"),
      CatalogItem::sheet("sheet_us2y", "US2Y", "rates-bonds/u.s.-2-year-bond-yield"),
      CatalogItem::sheet("sheet_us5y", "US5Y", "rates-bonds/u.s.-5-year-bond-yield"),
      CatalogItem::sheet("sheet_us10y", "US10Y", "rates-bonds/u.s.-10-year-bond-yield"),
      CatalogItem::sheet("sheet_us30y", "US30Y", "rates-bonds/u.s.-30-year-bond-yield"),
      CatalogItem::sheet("sheet_jgb2y", "JGB2Y", "rates-bonds/japan-2-year-bond-yield"),
      CatalogItem::sheet("sheet_jgb5y", "JGB5Y", "rates-bonds/japan-5-year-bond-yield"),
      CatalogItem::sheet("sheet_jgb10y", "JGB10Y", "rates-bonds/japan-10-year-bond-yield"),
      CatalogItem::sheet("sheet_jgb30y", "JGB30Y", "rates-bonds/japan-30-year-bond-yield"),
      CatalogItem::sheet("sheet_btcusd", "BTCUSD", "BTC-USD"),
    ];
    Catalog { items }
  }

  pub fn iter(&self) -> impl Iterator<Item = &CatalogItem> {
    self.items.iter()
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn find_by_name(&self, name: &str) -> Option<&CatalogItem> {
    self.items.iter().find(|item| item.name == name)
  }

  pub fn find_by_id(&self, id: &str) -> Option<&CatalogItem> {
    self.items.iter().find(|item| item.id == id)
  }

  /// Items fed from the record cache
  pub fn sheet_items(&self) -> impl Iterator<Item = &CatalogItem> {
    self.items.iter().filter(|item| item.is_sheet())
  }
}

impl Default for Catalog {
  fn default() -> Self {
    Catalog::builtin()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn test_builtin_names_and_ids_unique() {
    let catalog = Catalog::builtin();
    let names: HashSet<_> = catalog.iter().map(|i| i.name.as_str()).collect();
    let ids: HashSet<_> = catalog.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(names.len(), catalog.len());
    assert_eq!(ids.len(), catalog.len());
  }

  #[test]
  fn test_sheet_items() {
    let catalog = Catalog::builtin();
    let sheets: Vec<_> = catalog.sheet_items().map(|i| i.name.as_str()).collect();
    assert_eq!(sheets.len(), 13);
    assert!(sheets.contains(&"BTCUSD"));
    assert!(!sheets.contains(&"BTC"));
  }

  #[test]
  fn test_lookup() {
    let catalog = Catalog::builtin();
    assert_eq!(catalog.find_by_name("US10Y").map(|i| i.id.as_str()), Some("sheet_us10y"));
    assert_eq!(catalog.find_by_id("gold").map(|i| i.kind), Some(ItemKind::Widget));
    assert!(catalog.find_by_name("DOGE").is_none());
  }

  #[test]
  fn test_item_kind_accepts_empty_type() {
    let item: CatalogItem =
      serde_json::from_str(r#"{"id":"x","name":"X","symbol":"X","type":""}"#).unwrap();
    assert_eq!(item.kind, ItemKind::Widget);

    let sheet: CatalogItem =
      serde_json::from_str(r#"{"id":"y","name":"Y","symbol":"Y","type":"sheet"}"#).unwrap();
    assert!(sheet.is_sheet());
  }
}
