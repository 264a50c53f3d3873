use rmcp::model::{GetPromptResult, PromptMessage, PromptMessageRole};

pub fn emissions_review_prompt(company_id: Option<&str>, top_n: usize) -> GetPromptResult {
    match company_id {
        Some(id) => GetPromptResult::new(vec![PromptMessage::new_text(
                PromptMessageRole::User,
                format!(
                    "Review the carbon emissions of company {}.\n\nInclude:\n1. Transportation vs. energy split (kg CO2/year)\n2. The largest contributing categories\n3. How the company ranks against the top {} emitters\n4. Concrete reduction steps, prioritised by impact\n\nUse get_emissions with company_id={} for the record and summary, and top_emitters for the ranking.",
                    id, top_n, id
                ),
            )])
        .with_description(format!("Emissions review for company {}", id)),
        None => GetPromptResult::new(vec![PromptMessage::new_text(
                PromptMessageRole::User,
                format!(
                    "Give an overview of the emissions dataset.\n\nInclude:\n1. The top {} emitters with energy and transportation totals\n2. Which of them are above the 75 kg CO2/year threshold\n3. Patterns across companies (transport-heavy vs. energy-heavy)\n\nUse list_companies for the full list and top_emitters with limit={} for the ranking.",
                    top_n, top_n
                ),
            )])
        .with_description(format!("Emissions overview of the top {} companies", top_n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn company_prompt_mentions_id() {
        let p = emissions_review_prompt(Some("0042"), 10);
        assert_eq!(
            p.description.as_deref(),
            Some("Emissions review for company 0042")
        );
        assert_eq!(p.messages.len(), 1);
    }

    #[test]
    fn overview_prompt_without_id() {
        let p = emissions_review_prompt(None, 5);
        assert!(p.description.unwrap().contains("top 5"));
    }
}
