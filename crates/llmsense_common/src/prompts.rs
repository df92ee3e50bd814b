//! Prompt templates for interpretation, evaluation and debate.
//!
//! Pure string builders. Each template asks for a strict JSON reply, but the
//! shape is a request to the backend, not something checked here.

use crate::transcript::{DebateTranscript, Role};

/// Ask the backend to interpret a regression equation
pub fn build_interpretation_prompt(summary_equation: &str) -> String {
    format!(
        r#"You are an energy efficiency analyst for a steel plant.

**Regression Model (predicting Usage_kWh):**
```
{summary_equation}
```

Each coefficient shows how much energy usage changes for a one-unit change in that feature, with the other features held fixed. Indicator features such as `Load_Type_Maximum_Load` are 1 when the category applies and 0 otherwise.

Interpret the model for a non-technical plant manager. Identify the strongest drivers of energy usage, decide whether the pattern suggests equipment maintenance, and propose concrete optimizations that follow from the coefficients.

Respond ONLY with strict JSON using exactly these keys:
{{
  "maintenance_needed": "Yes" or "No",
  "reasoning": "A plain-language explanation grounded in the coefficients.",
  "energy_optimization_suggestions": ["suggestion 1", "suggestion 2"]
}}
"#
    )
}

/// Standard reflection: score the interpretation directly
pub fn build_reflection_prompt(summary_equation: &str, llm_reasoning: &str) -> String {
    format!(
        r#"You are an expert system designed to evaluate the quality of LLM-generated analysis.

**Original Data Summary (The Model Equation):**
```
{summary_equation}
```

**LLM's Interpretation and Reasoning:**
```
{llm_reasoning}
```

Please evaluate the LLM's reasoning based on the equation. Provide your output in a strict JSON format with the following keys:
- "correctness_score" (0-10): How accurately does the LLM interpret the key drivers from the equation?
- "clarity_score" (0-10): How clear and easy to understand is the layman's explanation?
- "practical_usefulness_score" (0-10): How actionable and relevant are the optimization suggestions?
- "improvement_suggestions": A brief summary of what the LLM could do to improve its analysis.
"#
    )
}

/// Chain-of-thought reflection: analyse step by step, then score
pub fn build_chain_of_thought_prompt(summary_equation: &str, llm_reasoning: &str) -> String {
    format!(
        r#"You are an expert system designed to evaluate the quality of LLM-generated analysis.

**Original Data Summary (The Model Equation):**
```
{summary_equation}
```

**LLM's Interpretation and Reasoning:**
```
{llm_reasoning}
```

Let's think step by step to evaluate the LLM's output.
1. **Analyze the Equation**: Identify the variables with the largest absolute coefficients. These are the most significant drivers of `Usage_kWh`. List them.
2. **Check for Correctness**: Compare the LLM's "reasoning" with the key drivers you identified. Did the LLM spot the most impactful variables? Does the reasoning follow from the signs (+/-) of the coefficients?
3. **Assess Clarity**: Read the "reasoning" as a non-technical plant manager would. Is the language simple, direct, and free of jargon?
4. **Evaluate Suggestions**: Are the "energy_optimization_suggestions" derived from the equation? For example, if `Lagging_Current_Reactive.Power_kVarh` has a high positive coefficient, a suggestion to improve the power factor is highly relevant.

After this analysis, provide your final evaluation in strict JSON with two keys: "thought_process" (your analysis from steps 1-4) and "final_scores" (with "correctness_score", "clarity_score" and "usefulness_score" from 0-10, plus "improvement_suggestions").
"#
    )
}

/// Single-round debate: one call plays both agents and the judge
pub fn build_single_debate_prompt(summary_equation: &str, llm_reasoning: &str) -> String {
    format!(
        r#"You are a moderator for an AI agent debate. Present the arguments from two opposing agents, then act as judge and declare a winner.

**Topic**: The quality of an LLM's analysis of a regression model.
**Model Equation**: `{summary_equation}`
**Original Analysis to be Debated**: `{llm_reasoning}`

**Agent A (Pro Argument)**: "The analysis is excellent. It identifies the main drivers of energy usage and gives clear, actionable advice supported by the model's coefficients."

**Agent B (Con Argument)**: "The analysis is flawed. It misreads the significance of the variables, overlooks critical interactions, or gives generic advice not tailored to the evidence in the equation."

**Your Task as Judge**:
1. Analyze both arguments in light of the equation and the original analysis.
2. Write a brief "Judge's Ruling" explaining which agent made the more compelling case and why.
3. Provide a final JSON object with scores for the original analysis.

**Output Format (Strict JSON):**
{{
  "judges_ruling": "A brief text explaining your decision.",
  "winning_argument": "Agent A" or "Agent B",
  "scores": {{
    "correctness_score": 0-10,
    "clarity_score": 0-10,
    "practical_usefulness_score": 0-10
  }}
}}
"#
    )
}

/// Prompt for one debate agent. `transcript` is everything said so far.
pub fn build_debate_agent_prompt(
    summary_equation: &str,
    llm_reasoning: &str,
    role: Role,
    transcript: &DebateTranscript,
) -> String {
    let history = transcript.render();
    match role {
        Role::Pro => format!(
            r#"You are a debate agent. Your goal is to DEFEND the following analysis based on the provided equation. Be specific and use the numbers from the equation to back up your points.

Equation: `{summary_equation}`
Analysis to Defend: `{llm_reasoning}`
{history}
Your turn. State your case concisely:"#
        ),
        Role::Con => format!(
            r#"You are a debate agent. Your goal is to CRITIQUE the following analysis based on the provided equation. Find flaws, missed insights, or unclear points. Be specific.

Equation: `{summary_equation}`
Analysis to Critique: `{llm_reasoning}`
{history}
Your turn. State your critique concisely:"#
        ),
    }
}

/// Final adjudication over the full transcript
pub fn build_judge_prompt(
    summary_equation: &str,
    llm_reasoning: &str,
    transcript: &DebateTranscript,
) -> String {
    let history = transcript.render();
    format!(
        r#"You are the judge of an AI debate. Below is the full transcript.
Analyze the debate, declare a winner, and provide a revised, improved version of the original analysis that incorporates the valid points from both sides.

**Original Model Equation**:
`{summary_equation}`

**Original Analysis**:
`{llm_reasoning}`

**Debate Transcript**:
{history}

**Your Final Judgement (Strict JSON Output):**
{{
  "debate_summary": "A brief summary of the key arguments from both sides.",
  "winner": "Pro Agent" or "Con Agent",
  "reason_for_decision": "Explain your ruling.",
  "final_scores": {{"correctness_score": 0-10, "clarity_score": 0-10, "usefulness_score": 0-10}},
  "revised_pro": "A new, improved version of the analysis. This must be a complete JSON object with 'maintenance_needed', 'reasoning', and 'energy_optimization_suggestions' keys."
}}
"#
    )
}
