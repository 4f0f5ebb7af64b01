//! Question text sent to the backend

pub fn overview_question(file_name: &str) -> String {
    format!(
        "Give a concise overview of the health-insurance document \"{file_name}\". \
         Cover what kind of plan or form it is, the main benefits, deductibles, \
         copays and coinsurance, out-of-pocket limits, and anything a member \
         should watch out for. Use short markdown sections and bullet points."
    )
}

pub fn highlight_question(selected: &str) -> String {
    format!(
        "A user highlighted this passage in a health-insurance document:\n\n\
         \"{selected}\"\n\n\
         Explain what it means in plain language and how it could affect \
         what the member pays or what is covered."
    )
}

pub fn follow_up_question(selected: &str, question: &str) -> String {
    format!(
        "A user highlighted this passage in a health-insurance document:\n\n\
         \"{selected}\"\n\n\
         Their question about it: {question}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overview_names_the_file() {
        assert!(overview_question("policy.pdf").contains("\"policy.pdf\""));
    }

    #[test]
    fn test_follow_up_embeds_selection_and_question() {
        let prompt = follow_up_question("Coinsurance: 20% after deductible", "Does it apply to ER?");
        assert!(prompt.contains("\"Coinsurance: 20% after deductible\""));
        assert!(prompt.ends_with("Does it apply to ER?"));
    }

    #[test]
    fn test_highlight_embeds_selection() {
        assert!(highlight_question("Copay: $30").contains("\"Copay: $30\""));
    }
}
