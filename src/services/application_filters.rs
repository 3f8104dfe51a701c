// src/services/application_filters.rs
//
// Estado de filtro compartilhado pelas três tabelas de solicitações.

use serde::{Deserialize, Serialize};

use crate::{
    common::filter_utils::{
        filter_by_collective_code, filter_by_collective_housing_name, filter_by_contractor_id,
        filter_by_customer_code, filter_by_customer_name, filter_by_order_number,
        filter_by_phone_number, filter_by_property_type, filter_by_status, filter_by_team_id,
        Filterable,
    },
    models::application::PropertyType,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterKey {
    OrderNumber,
    PropertyType,
    CustomerCode,
    CustomerName,
    CollectiveCode,
    CollectiveHousingName,
    PhoneNumber,
    ContractorId,
    TeamId,
    Status,
}

impl FilterKey {
    pub fn parse(key: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(key.to_string())).ok()
    }
}

/// String vazia = filtro desligado.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationFilters {
    pub order_number: String,
    pub property_type: String,
    pub customer_code: String,
    pub customer_name: String,
    pub collective_code: String,
    pub collective_housing_name: String,
    pub phone_number: String,
    pub contractor_id: String,
    pub team_id: String,
    pub status: String,
}

impl ApplicationFilters {
    /// Reproduz a sequência de edições (pares chave=valor da query string), na ordem.
    /// `clear` zera tudo o que veio antes; chaves desconhecidas são ignoradas.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut filters = Self::default();
        for (key, value) in pairs {
            match (key, FilterKey::parse(key)) {
                ("clear", _) => filters.clear_filters(),
                (_, Some(key)) => filters.update_filter(key, value),
                (_, None) => tracing::debug!("Filtro desconhecido ignorado: {}", key),
            }
        }
        filters
    }

    fn field_mut(&mut self, key: FilterKey) -> &mut String {
        match key {
            FilterKey::OrderNumber => &mut self.order_number,
            FilterKey::PropertyType => &mut self.property_type,
            FilterKey::CustomerCode => &mut self.customer_code,
            FilterKey::CustomerName => &mut self.customer_name,
            FilterKey::CollectiveCode => &mut self.collective_code,
            FilterKey::CollectiveHousingName => &mut self.collective_housing_name,
            FilterKey::PhoneNumber => &mut self.phone_number,
            FilterKey::ContractorId => &mut self.contractor_id,
            FilterKey::TeamId => &mut self.team_id,
            FilterKey::Status => &mut self.status,
        }
    }

    /// Grava o valor e limpa os campos que dependem dele:
    /// tipo de imóvel != 個別 limpa código/nome do cliente,
    /// != 集合 limpa código/nome do 集合住宅, e trocar a contratada limpa a equipe.
    pub fn update_filter(&mut self, key: FilterKey, value: &str) {
        *self.field_mut(key) = value.trim().to_string();

        match key {
            FilterKey::PropertyType => {
                let property_type = PropertyType::from_filter_value(value);
                if property_type != Some(PropertyType::Individual) {
                    self.customer_code.clear();
                    self.customer_name.clear();
                }
                if property_type != Some(PropertyType::Collective) {
                    self.collective_code.clear();
                    self.collective_housing_name.clear();
                }
            }
            FilterKey::ContractorId => self.team_id.clear(),
            _ => {}
        }
    }

    pub fn clear_filters(&mut self) {
        *self = Self::default();
    }

    pub fn active_filter_count(&self) -> usize {
        [
            &self.order_number,
            &self.property_type,
            &self.customer_code,
            &self.customer_name,
            &self.collective_code,
            &self.collective_housing_name,
            &self.phone_number,
            &self.contractor_id,
            &self.team_id,
            &self.status,
        ]
        .iter()
        .filter(|value| !value.is_empty())
        .count()
    }

    /// Passa a lista por cada filtro de campo. Ordem relativa preservada.
    pub fn apply<T: Filterable>(&self, items: Vec<T>) -> Vec<T> {
        let items = filter_by_order_number(items, &self.order_number);
        let items = filter_by_property_type(items, &self.property_type);
        let items = filter_by_customer_code(items, &self.customer_code);
        let items = filter_by_customer_name(items, &self.customer_name);
        let items = filter_by_collective_code(items, &self.collective_code);
        let items = filter_by_collective_housing_name(items, &self.collective_housing_name);
        let items = filter_by_phone_number(items, &self.phone_number);
        let items = filter_by_contractor_id(items, &self.contractor_id);
        let items = filter_by_team_id(items, &self.team_id);
        filter_by_status(items, &self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::filter_utils::tests::Row;

    #[test]
    fn switching_to_collective_clears_customer_code() {
        let mut filters = ApplicationFilters::default();
        filters.update_filter(FilterKey::PropertyType, "個別");
        filters.update_filter(FilterKey::CustomerCode, "12345");
        filters.update_filter(FilterKey::PropertyType, "集合");
        assert_eq!(filters.customer_code, "");
        assert_eq!(filters.property_type, "集合");
    }

    #[test]
    fn switching_to_individual_clears_collective_fields() {
        let mut filters = ApplicationFilters::default();
        filters.update_filter(FilterKey::CollectiveCode, "K1");
        filters.update_filter(FilterKey::CollectiveHousingName, "ハイツ");
        filters.update_filter(FilterKey::PropertyType, "individual");
        assert!(filters.collective_code.is_empty());
        assert!(filters.collective_housing_name.is_empty());
    }

    #[test]
    fn changing_contractor_clears_team() {
        let mut filters = ApplicationFilters::default();
        filters.update_filter(FilterKey::TeamId, "t-1");
        filters.update_filter(FilterKey::ContractorId, "c-2");
        assert!(filters.team_id.is_empty());
        filters.update_filter(FilterKey::TeamId, "t-2");
        assert_eq!(filters.team_id, "t-2");
    }

    #[test]
    fn counts_and_clears() {
        let mut filters = ApplicationFilters::from_pairs([
            ("orderNumber", "2024"),
            ("status", "受付"),
            ("page", "2"),
        ]);
        assert_eq!(filters.active_filter_count(), 2);
        filters.clear_filters();
        assert_eq!(filters, ApplicationFilters::default());
        assert_eq!(filters.active_filter_count(), 0);
    }

    #[test]
    fn clear_pair_resets_earlier_edits() {
        let filters = ApplicationFilters::from_pairs([
            ("status", "受付"),
            ("clear", ""),
            ("phoneNumber", "090"),
        ]);
        assert_eq!(filters.active_filter_count(), 1);
        assert!(filters.status.is_empty());
    }

    #[test]
    fn order_and_status_pipeline_keeps_relative_order() {
        let mut a = Row::individual("2024031500001", "C001", "山田");
        let mut b = Row::individual("2024031500001", "C002", "鈴木");
        let mut c = Row::collective("2024031500001", "K1", "ハイツ");
        let mut d = Row::individual("2024031600002", "C003", "佐藤");
        a.status = "受付";
        b.status = "提出済";
        c.status = "受付";
        d.status = "受付";

        let filters =
            ApplicationFilters::from_pairs([("orderNumber", "2024031500001"), ("status", "受付")]);
        let out = filters.apply(vec![a.clone(), b, c.clone(), d]);
        assert_eq!(out, vec![a, c]);
    }
}
