// src/common/filter_utils.rs
//
// Um filtro por campo. Todos seguem o mesmo contrato:
// consulta vazia devolve a lista intacta; caso contrário, mantém só os itens
// que satisfazem o predicado, preservando a ordem original.

use uuid::Uuid;

use crate::models::application::PropertyType;

/// O que uma linha das tabelas de solicitações expõe para a busca.
pub trait Filterable {
    fn order_number(&self) -> &str;
    fn property_type(&self) -> PropertyType;
    fn customer_code(&self) -> &str;
    fn customer_name(&self) -> &str;
    fn collective_code(&self) -> &str;
    fn collective_housing_name(&self) -> &str;
    fn phone_number(&self) -> &str;
    fn contractor_id(&self) -> Option<Uuid>;
    fn team_id(&self) -> Option<Uuid>;
    fn status_label(&self) -> &str;
}

const HIRAGANA_START: u32 = 0x3041;
const HIRAGANA_END: u32 = 0x3096;
const KATAKANA_OFFSET: u32 = 0x60;

/// Desloca só o bloco hiragana (U+3041..=U+3096) em +0x60. Katakana e o resto ficam iguais.
pub fn hiragana_to_katakana(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            let code = c as u32;
            if (HIRAGANA_START..=HIRAGANA_END).contains(&code) {
                char::from_u32(code + KATAKANA_OFFSET).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

/// Substring insensível a hiragana/katakana.
pub fn matches_text(candidate: &str, query: &str) -> bool {
    hiragana_to_katakana(candidate).contains(&hiragana_to_katakana(query))
}

fn strip_hyphens(value: &str) -> String {
    value.chars().filter(|c| *c != '-').collect()
}

fn same_id(id: Option<Uuid>, query: &str) -> bool {
    id.is_some_and(|id| id.to_string().eq_ignore_ascii_case(query.trim()))
}

fn retain<T>(items: Vec<T>, query: &str, keep: impl Fn(&T) -> bool) -> Vec<T> {
    if query.is_empty() {
        return items;
    }
    items.into_iter().filter(|item| keep(item)).collect()
}

pub fn filter_by_order_number<T: Filterable>(items: Vec<T>, query: &str) -> Vec<T> {
    retain(items, query, |item| item.order_number().contains(query))
}

pub fn filter_by_phone_number<T: Filterable>(items: Vec<T>, query: &str) -> Vec<T> {
    let normalized = strip_hyphens(query);
    retain(items, query, |item| {
        strip_hyphens(item.phone_number()).contains(&normalized)
    })
}

pub fn filter_by_contractor_id<T: Filterable>(items: Vec<T>, query: &str) -> Vec<T> {
    retain(items, query, |item| same_id(item.contractor_id(), query))
}

pub fn filter_by_team_id<T: Filterable>(items: Vec<T>, query: &str) -> Vec<T> {
    retain(items, query, |item| same_id(item.team_id(), query))
}

pub fn filter_by_status<T: Filterable>(items: Vec<T>, query: &str) -> Vec<T> {
    retain(items, query, |item| item.status_label() == query)
}

/// Aceita "individual"/"個別" e "collective"/"集合". Valor desconhecido não casa com nada.
pub fn filter_by_property_type<T: Filterable>(items: Vec<T>, query: &str) -> Vec<T> {
    let wanted = PropertyType::from_filter_value(query);
    retain(items, query, |item| Some(item.property_type()) == wanted)
}

// Filtros condicionados ao tipo de imóvel: itens do outro tipo nunca são excluídos.

pub fn filter_by_customer_code<T: Filterable>(items: Vec<T>, query: &str) -> Vec<T> {
    retain(items, query, |item| {
        item.property_type() != PropertyType::Individual
            || matches_text(item.customer_code(), query)
    })
}

pub fn filter_by_customer_name<T: Filterable>(items: Vec<T>, query: &str) -> Vec<T> {
    retain(items, query, |item| {
        item.property_type() != PropertyType::Individual
            || matches_text(item.customer_name(), query)
    })
}

pub fn filter_by_collective_code<T: Filterable>(items: Vec<T>, query: &str) -> Vec<T> {
    retain(items, query, |item| {
        item.property_type() != PropertyType::Collective
            || matches_text(item.collective_code(), query)
    })
}

pub fn filter_by_collective_housing_name<T: Filterable>(items: Vec<T>, query: &str) -> Vec<T> {
    retain(items, query, |item| {
        item.property_type() != PropertyType::Collective
            || matches_text(item.collective_housing_name(), query)
    })
}
