//! Tests for query module

#[cfg(test)]
mod tests {
    use roaring::RoaringBitmap;

    use crate::error::Error;
    use crate::query::*;
    use crate::storage::Storage;
    use crate::test_fixtures::sample_storage;

    fn ids(bitmap: &RoaringBitmap) -> Vec<u32> {
        bitmap.iter().collect()
    }

    fn index() -> Vec<Option<RoaringBitmap>> {
        vec![
            Some([1, 2].into_iter().collect()),
            Some([2, 3].into_iter().collect()),
            Some([1, 3].into_iter().collect()),
            None,
        ]
    }

    // ========================================================================
    // Tokenizer
    // ========================================================================

    #[test]
    fn test_tokenize_records_offsets() {
        // Arrange & Act
        let tokens = tokenize("(12 & 3)|4").expect("tokenize");

        // Assert
        assert_eq!(
            tokens,
            vec![
                (0, Token::Open),
                (1, Token::Feature(Some(12))),
                (4, Token::And),
                (6, Token::Feature(Some(3))),
                (7, Token::Close),
                (8, Token::Or),
                (9, Token::Feature(Some(4))),
            ]
        );
    }

    #[test]
    fn test_tokenize_oversized_literal_has_no_id() {
        let tokens = tokenize("99999999999").expect("tokenize");
        assert_eq!(tokens, vec![(0, Token::Feature(None))]);
    }

    #[test]
    fn test_tokenize_rejects_unknown_character() {
        // Act
        let err = tokenize("1&x").expect_err("should fail");

        // Assert
        assert!(matches!(err, Error::InvalidExpression { position: 2, .. }));
    }

    // ========================================================================
    // Evaluation order
    // ========================================================================

    #[test]
    fn test_evaluate_single_feature() {
        let index = index();
        let result = QueryEvaluator::new(&index).evaluate("0").expect("evaluate");
        assert_eq!(ids(&result), vec![1, 2]);
    }

    #[test]
    fn test_evaluate_and() {
        let index = index();
        let result = QueryEvaluator::new(&index).evaluate("0&1").expect("evaluate");
        assert_eq!(ids(&result), vec![2]);
    }

    #[test]
    fn test_evaluate_or() {
        let index = index();
        let result = QueryEvaluator::new(&index).evaluate("0|1").expect("evaluate");
        assert_eq!(ids(&result), vec![1, 2, 3]);
    }

    #[test]
    fn test_evaluate_group_then_or() {
        let index = index();
        let result = QueryEvaluator::new(&index)
            .evaluate("(0&1)|2")
            .expect("evaluate");
        assert_eq!(ids(&result), vec![1, 2, 3]);
    }

    #[test]
    fn test_evaluate_is_eager_left_to_right() {
        // Arrange
        let index = index();
        let evaluator = QueryEvaluator::new(&index);

        // Act
        let result = evaluator.evaluate("0&2|1").expect("evaluate");

        // Assert: ((∅ | {1,2}) & {1,3}) | {2,3}
        assert_eq!(ids(&result), vec![1, 2, 3]);
    }

    #[test]
    fn test_evaluate_outer_operator_applies_to_group() {
        // Arrange
        let index = index();
        let evaluator = QueryEvaluator::new(&index);

        // Act: {1,2} & ({2,3} | {1,3})
        let result = evaluator.evaluate("0&(1|2)").expect("evaluate");

        // Assert
        assert_eq!(ids(&result), vec![1, 2]);
    }

    #[test]
    fn test_evaluate_group_operator_resets() {
        // Arrange
        let index = index();
        let evaluator = QueryEvaluator::new(&index);

        // Act: the `&` inside the first group does not leak into the second
        let result = evaluator.evaluate("(0&1)|(2)").expect("evaluate");

        // Assert
        assert_eq!(ids(&result), vec![1, 2, 3]);
    }

    #[test]
    fn test_evaluate_leading_and_starts_from_empty() {
        let index = index();
        let result = QueryEvaluator::new(&index).evaluate("&0").expect("evaluate");
        assert!(result.is_empty());
    }

    #[test]
    fn test_evaluate_empty_expression_matches_nothing() {
        let index = index();
        let result = QueryEvaluator::new(&index).evaluate("").expect("evaluate");
        assert!(result.is_empty());
    }

    #[test]
    fn test_evaluate_ignores_whitespace() {
        let index = index();
        let result = QueryEvaluator::new(&index)
            .evaluate(" 0 & 1 ")
            .expect("evaluate");
        assert_eq!(ids(&result), vec![2]);
    }

    // ========================================================================
    // Missing and out-of-range features
    // ========================================================================

    #[test]
    fn test_evaluate_out_of_range_feature_is_skipped() {
        // Arrange
        let index = index();
        let evaluator = QueryEvaluator::new(&index);

        // Act
        let and_result = evaluator.evaluate("0&42").expect("evaluate");
        let or_result = evaluator.evaluate("0|42").expect("evaluate");

        // Assert
        assert_eq!(ids(&and_result), vec![1, 2]);
        assert_eq!(ids(&or_result), vec![1, 2]);
    }

    #[test]
    fn test_evaluate_absent_feature_clears_under_and() {
        let index = index();
        let result = QueryEvaluator::new(&index).evaluate("0&3").expect("evaluate");
        assert!(result.is_empty());
    }

    #[test]
    fn test_evaluate_absent_feature_is_noop_under_or() {
        let index = index();
        let result = QueryEvaluator::new(&index).evaluate("0|3").expect("evaluate");
        assert_eq!(ids(&result), vec![1, 2]);
    }

    // ========================================================================
    // Malformed expressions
    // ========================================================================

    #[test]
    fn test_evaluate_redundant_nesting() {
        let index = index();
        let result = QueryEvaluator::new(&index).evaluate("((0))").expect("evaluate");
        assert_eq!(ids(&result), vec![1, 2]);
    }

    #[test]
    fn test_evaluate_nested_group_uses_enclosing_operator() {
        // Arrange
        let index = index();
        let evaluator = QueryEvaluator::new(&index);

        // Act
        let inner_or = evaluator.evaluate("0&(1|(2))").expect("evaluate");
        let inner_and = evaluator.evaluate("(0&(1))").expect("evaluate");
        let deep = evaluator.evaluate("(2&(0|(1&0)))|1").expect("evaluate");

        // Assert: {1,2} & ({2,3} | {1,3})
        assert_eq!(ids(&inner_or), vec![1, 2]);
        // {1,2} & {2,3}
        assert_eq!(ids(&inner_and), vec![2]);
        // ({1,3} & ({1,2} | ({2,3} & {1,2}))) | {2,3}
        assert_eq!(ids(&deep), vec![1, 2, 3]);
    }

    #[test]
    fn test_evaluate_nested_group_resets_operator() {
        // The inner group starts from an empty accumulator with `|`, even
        // when the enclosing group last saw `&`.
        let index = index();
        let result = QueryEvaluator::new(&index)
            .evaluate("(1&(0|2))")
            .expect("evaluate");
        assert_eq!(ids(&result), vec![2, 3]);
    }

    #[test]
    fn test_evaluate_rejects_unclosed_nested_group() {
        let index = index();
        let err = QueryEvaluator::new(&index).evaluate("((0)").expect_err("unclosed");
        assert!(matches!(err, Error::InvalidExpression { position: 0, .. }));
    }

    #[test]
    fn test_evaluate_rejects_unbalanced_close() {
        let index = index();
        let err = QueryEvaluator::new(&index).evaluate("0)").expect_err("unbalanced");
        assert!(matches!(err, Error::InvalidExpression { position: 1, .. }));
    }

    #[test]
    fn test_evaluate_rejects_unclosed_group() {
        let index = index();
        let err = QueryEvaluator::new(&index).evaluate("1|(0").expect_err("unclosed");
        assert!(matches!(err, Error::InvalidExpression { position: 2, .. }));
    }

    // ========================================================================
    // Operator
    // ========================================================================

    #[test]
    fn test_operator_default_is_or() {
        assert_eq!(Operator::default(), Operator::Or);
    }

    #[test]
    fn test_operator_apply_missing_operand() {
        // Arrange
        let mut acc: RoaringBitmap = [1, 2].into_iter().collect();

        // Act & Assert
        Operator::Or.apply(&mut acc, None);
        assert_eq!(ids(&acc), vec![1, 2]);
        Operator::And.apply(&mut acc, None);
        assert!(acc.is_empty());
    }

    // ========================================================================
    // Storage integration
    // ========================================================================

    #[test]
    fn test_storage_evaluate_uses_loaded_index() {
        let storage = sample_storage();
        let result = storage.evaluate("0&2|1").expect("evaluate");
        assert_eq!(ids(&result), vec![1, 2, 3]);
    }

    #[test]
    fn test_storage_evaluate_before_load_fails() {
        // Arrange
        let mut storage = Storage::new();
        assert!(matches!(storage.evaluate("0"), Err(Error::NotInitialized)));
        storage.init_storage(1, 1).expect("init");

        // Act
        let result = storage.evaluate("0");

        // Assert
        assert!(matches!(result, Err(Error::NotReady)));
    }
}
