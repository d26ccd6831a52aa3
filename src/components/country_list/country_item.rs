use ratatui::{
  style::{Modifier, Style},
  text::{Line, Span},
  widgets::ListItem,
};

use crate::countries::Country;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryItem {
  pub country: Country,
}

impl CountryItem {
  pub fn new(country: Country) -> Self {
    CountryItem { country }
  }

  pub fn render(&self) -> ListItem<'_> {
    let mut text = Line::default();
    let mut parts = vec![Span::from(self.country.name.clone())];

    if !self.country.region.is_empty() {
      parts.push(Span::from(format!(" ({})", self.country.region)).style(Style::default().add_modifier(Modifier::DIM)));
    }

    text = text.spans(parts);
    ListItem::from(text)
  }

  /// One line summary of the details not shown in the list.
  pub fn details(&self) -> String {
    let mut details = Vec::new();
    if let Some(capital) = &self.country.capital {
      details.push(format!("Capital: {}", capital));
    }
    if !self.country.region.is_empty() {
      details.push(format!("Region: {}", self.country.region));
    }
    details.push(format!("Population: {}", format_population(self.country.population)));
    if let Some(flag) = &self.country.flag {
      details.push(format!("Flag: {}", flag));
    }
    details.join(" | ")
  }
}

fn format_population(population: u64) -> String {
  let digits = population.to_string();
  let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
  for (index, digit) in digits.chars().enumerate() {
    if index > 0 && (digits.len() - index) % 3 == 0 {
      grouped.push(',');
    }
    grouped.push(digit);
  }
  grouped
}
