//! Rendering of complete queries.

mod common;

use common::fixtures::catalog;
use metasearch_query::{
    Clause, ComparisonOperator, CompilerOptions, GraphQueryBuilder, Literal, Namespace,
    QueryAssembly, Rule, SearchExpression, SearchValue, SequencingOrder, Term, TriplePattern,
    TypeScope,
};

#[test]
fn test_entity_search_with_text_index() {
    let catalog = catalog();
    let options = CompilerOptions::default().with_text_index();
    let mut query = QueryAssembly::new(&catalog, &options);
    query.add_type_filter_by_name("GlossaryTerm");
    query.add_status_filter(None);
    query.add_conditions(
        &SearchExpression::condition("name", ComparisonOperator::Eq, SearchValue::string("Inventory")),
        &Namespace::Entity,
        &TypeScope::of(["Asset", "GlossaryTerm"]),
    );
    query.add_sequencing(
        SequencingOrder::CreationDateRecent,
        None,
        &Namespace::Entity,
        &TypeScope::unrestricted(),
    );
    query.add_paging(Some(10), Some(5));

    let expected = r#"{:find [?e ?sort]
 :where [[?e :type.guids "g-term"]
         [?e :currentStatus ?status]
         [(not= ?status 99)]
         [(wildcard-text-search "\"Inventory\"") [[?e ?v ?a]]]
         [(= (namespace ?a) "entityProperties")]
         [(clojure.string/ends-with? (str ?a) ".name")]
         [(= ?v "Inventory")]
         [?e :createTime ?sort]]
 :order-by [[?sort :desc]]
 :offset 10
 :limit 5}"#;
    assert_eq!(query.compile().explain(), expected);
}

#[test]
fn test_grouped_search_without_index() {
    let catalog = catalog();
    let options = CompilerOptions::default();
    let mut query = QueryAssembly::new(&catalog, &options);
    query.add_conditions(
        &SearchExpression::any(vec![
            SearchExpression::condition("owner", ComparisonOperator::Eq, SearchValue::string("ann")),
            SearchExpression::none(vec![SearchExpression::condition(
                "rank",
                ComparisonOperator::Lte,
                SearchValue::Long(2),
            )]),
        ]),
        &Namespace::Entity,
        &TypeScope::of(["Process"]),
    );

    let expected = "{:find [?e]\n :where [(or-join [?e] \
                    [?e :entityProperties/Asset.owner \"ann\"] \
                    (not-join [?e] [?e :entityProperties/Process.rank ?v] [(<= ?v 2)]))]}";
    assert_eq!(query.compile().explain(), expected);
}

#[test]
fn test_relationship_search() {
    let catalog = catalog();
    let options = CompilerOptions::default();
    let mut graph = GraphQueryBuilder::new(&catalog, &options);
    graph.add_endpoint_clause(Some("term-1"));
    graph.add_relationship_type_filter_by_name("SemanticAssignment");

    let expected = "{:find [?e ?r]\n :where [[?r :entityProxies ?e]\n         \
                    [?r :entityProxies \"term-1\"]\n         \
                    [?r :type.guids \"g-sa\"]]}";
    assert_eq!(graph.compile().explain(), expected);
}

#[test]
fn test_rules_are_rendered() {
    let catalog = catalog();
    let options = CompilerOptions::default();
    let mut query = QueryAssembly::new(&catalog, &options);
    let x = query.var("?x");
    let rule = Rule::new(
        "active",
        vec![x],
        vec![Clause::triple(TriplePattern::value(x, "currentStatus", Literal::Long(15)))],
    );
    let row = query.row_var();
    query.add_clause(rule.call(vec![Term::Var(row)]));
    query.add_rule(rule);

    let expected = "{:find [?e]\n :where [(active ?e)]\n :rules [[(active ?x) [?x :currentStatus 15]]]}";
    assert_eq!(query.compile().explain(), expected);
}
