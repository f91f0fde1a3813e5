// Grouping and ordering of raw deals into title variants
use crate::model::{AggregatedOffer, RawDeal};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Groups deals by their own title (editions stay separate variants), keeps
/// the cheapest offer per store within each variant, sorts offers ascending
/// by effective price and variants descending by store count. Ordering is
/// stable: ties keep first-encounter order. Deals without a store id are
/// dropped; there is no stall to attribute them to.
///
/// The grouping key is deliberately not normalized, so two spellings of the
/// same edition form separate variants. The filter steps normalize, this
/// one does not.
pub fn aggregate(deals: Vec<RawDeal>) -> Vec<AggregatedOffer> {
    let mut title_order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<RawDeal>> = HashMap::new();

    for deal in deals {
        let Some(store_id) = deal.store_id.clone() else {
            continue;
        };

        if !groups.contains_key(&deal.title) {
            title_order.push(deal.title.clone());
        }
        let group = groups.entry(deal.title.clone()).or_default();

        match group
            .iter_mut()
            .find(|d| d.store_id.as_deref() == Some(store_id.as_str()))
        {
            Some(existing) => {
                // Strict less-than: first-seen wins price ties.
                if deal.effective_price() < existing.effective_price() {
                    *existing = deal;
                }
            }
            None => group.push(deal),
        }
    }

    let mut variants: Vec<AggregatedOffer> = title_order
        .into_iter()
        .map(|title| {
            let mut offers = groups.remove(&title).unwrap_or_default();
            offers.sort_by(|a, b| {
                a.effective_price()
                    .partial_cmp(&b.effective_price())
                    .unwrap_or(Ordering::Equal)
            });
            AggregatedOffer {
                title_variant: title,
                offers,
            }
        })
        .collect();

    variants.sort_by(|a, b| b.offers.len().cmp(&a.offers.len()));
    variants
}
