//! Prompt templates for the different diagram kinds. Each template asks the
//! model for bare Mermaid source starting with 'flowchart TD'; models that
//! wrap the output in code fences anyway are handled by the sanitizer.

pub fn story(content: &str, title: &str) -> String {
    format!(
        "Generate a Mermaid.js flowchart diagram that represents the plot structure of this story:\n\
        \n\
        Title: {title}\n\
        Content: {content}\n\
        \n\
        Create a flowchart that shows:\n\
        1. The main plot points and story progression\n\
        2. Key decision points or conflicts\n\
        3. Character interactions or relationships\n\
        4. Story resolution\n\
        \n\
        Use proper Mermaid.js flowchart syntax starting with 'flowchart TD' and use appropriate node shapes:\n\
        - [Text] for regular steps/events\n\
        - {{Text}} for decision points\n\
        - ((Text)) for start/end points\n\
        \n\
        Return ONLY the Mermaid code without any explanation.\n\
        \n\
        Example format:\n\
        flowchart TD\n\
        \u{20}   A((Start)) --> B[Setup]\n\
        \u{20}   B --> C{{Decision?}}\n\
        \u{20}   C -->|Yes| D[Action 1]\n\
        \u{20}   C -->|No| E[Action 2]\n\
        \u{20}   D --> F((End))\n\
        \u{20}   E --> F"
    )
}

pub fn description(description: &str) -> String {
    format!(
        "Generate a Mermaid.js flowchart diagram with the following requirements:\n\
        \n\
        {description}\n\
        \n\
        Use proper Mermaid.js flowchart syntax starting with 'flowchart TD' and use appropriate node shapes and arrow connections. Return ONLY the Mermaid code without any explanation.\n\
        \n\
        Example format:\n\
        flowchart TD\n\
        \u{20}   A[Start] --> B[Step 1]\n\
        \u{20}   B --> C{{Decision?}}\n\
        \u{20}   C -->|Yes| D[Option 1]\n\
        \u{20}   C -->|No| E[Option 2]"
    )
}

pub fn ensemble(description: &str) -> String {
    format!(
        "Generate a Mermaid.js flowchart that shows the main story flow and ensemble interactions:\n\
        \n\
        {description}\n\
        \n\
        Create a comprehensive flowchart that shows:\n\
        1. The overall plot progression\n\
        2. Key decision points that affect multiple characters\n\
        3. Major story beats and climax\n\
        4. How different characters' paths intersect\n\
        5. The resolution that ties everyone together\n\
        \n\
        Focus on the BIG PICTURE story structure. Use proper Mermaid.js syntax starting with 'flowchart TD'.\n\
        Return ONLY the Mermaid code without any explanation.\n\
        \n\
        Example format:\n\
        flowchart TD\n\
        \u{20}   A[Story Opening] --> B[Characters Meet]\n\
        \u{20}   B --> C{{Major Conflict}}\n\
        \u{20}   C -->|Path 1| D[Character Actions]\n\
        \u{20}   C -->|Path 2| E[Alternative Response]\n\
        \u{20}   D --> F[Climax]\n\
        \u{20}   E --> F\n\
        \u{20}   F --> G[Resolution]"
    )
}

pub fn character(description: &str, name: &str) -> String {
    format!(
        "Generate a Mermaid.js flowchart focused specifically on {name}'s journey in this story:\n\
        \n\
        Story Context: {description}\n\
        \n\
        Create a flowchart that shows:\n\
        1. {name}'s introduction and initial state\n\
        2. Their personal goals and motivations\n\
        3. Challenges and obstacles they face\n\
        4. Key decisions {name} makes\n\
        5. Their character arc and growth\n\
        6. How they contribute to the resolution\n\
        \n\
        Focus ONLY on {name}'s personal journey and development. Use proper Mermaid.js syntax starting with 'flowchart TD'.\n\
        Return ONLY the Mermaid code without any explanation.\n\
        \n\
        Example format:\n\
        flowchart TD\n\
        \u{20}   A[{name} Introduction] --> B[Initial Goal]\n\
        \u{20}   B --> C[Obstacle Appears]\n\
        \u{20}   C --> D{{{name} Decision?}}\n\
        \u{20}   D -->|Choice 1| E[Action/Growth]\n\
        \u{20}   D -->|Choice 2| F[Alternative Path]\n\
        \u{20}   E --> G[Character Development]\n\
        \u{20}   F --> G\n\
        \u{20}   G --> H[Final State]"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_prompt_embeds_title_and_content() {
        let prompt = story("Once upon a time", "The Quest");
        assert!(prompt.contains("Title: The Quest"));
        assert!(prompt.contains("Content: Once upon a time"));
        assert!(prompt.contains("flowchart TD"));
    }

    #[test]
    fn test_description_prompt_embeds_description() {
        let prompt = description("a login flow");
        assert!(prompt.contains("a login flow"));
        assert!(prompt.contains("Return ONLY the Mermaid code"));
    }

    #[test]
    fn test_ensemble_prompt_asks_for_big_picture() {
        let prompt = ensemble("three travelers meet");
        assert!(prompt.contains("three travelers meet"));
        assert!(prompt.contains("BIG PICTURE"));
    }

    #[test]
    fn test_character_prompt_is_scoped_to_one_name() {
        let prompt = character("three travelers meet", "Ari");
        assert!(prompt.contains("Focus ONLY on Ari's personal journey"));
        assert!(prompt.contains("Key decisions Ari makes"));
    }
}
