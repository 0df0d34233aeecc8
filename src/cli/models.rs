//! Models command implementation

use crate::catalog::ModelCatalog;
use crate::cli::output::{format_models_json, format_models_table, ModelView};
use crate::cli::{load_config, ModelsArgs};

/// Handle `switchyard models`
pub fn handle_models(args: &ModelsArgs) -> anyhow::Result<String> {
    let config = load_config(args.config.as_deref())?;
    config.validate()?;
    list_models(&config.catalog()?, args)
}

pub(crate) fn list_models(catalog: &ModelCatalog, args: &ModelsArgs) -> anyhow::Result<String> {
    let mut models: Vec<&_> = catalog
        .iter()
        .filter(|model| args.tier.is_none_or(|tier| model.tier == tier))
        .collect();

    // most capable first, cheapest first within a tier
    models.sort_by(|a, b| {
        b.tier
            .cmp(&a.tier)
            .then_with(|| {
                (a.cost_per_1m_input + a.cost_per_1m_output)
                    .total_cmp(&(b.cost_per_1m_input + b.cost_per_1m_output))
            })
            .then_with(|| a.id.cmp(&b.id))
    });

    let views: Vec<ModelView> = models.into_iter().map(ModelView::from).collect();

    if args.json {
        Ok(format_models_json(&views)?)
    } else {
        Ok(format_models_table(&views))
    }
}
