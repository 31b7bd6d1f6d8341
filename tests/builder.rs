//! Builder tests
//!
//! Stage editing, forms, parameter passing and the merged preview, driven
//! through a `Session` over the fixture catalog.
mod common;
use common::*;
use thingtalk_builder::builder::{NOTHING_SELECTED, resolve_value};
use thingtalk_builder::prelude::*;

#[cfg(test)]
mod preview_tests {
    use super::*;

    #[test]
    fn test_nothing_selected() {
        let session = create_session();
        assert_eq!(session.preview(), NOTHING_SELECTED);
        for stage in Stage::ALL {
            assert_eq!(session.component_preview(stage), "");
        }
    }

    #[test]
    fn test_each_stage_previews_alone() {
        let cases = [
            (
                Stage::Stream,
                "com.xkcd",
                "get_comic",
                "monitor (@com.xkcd.get_comic()) => notify;",
            ),
            (
                Stage::Query,
                "com.xkcd",
                "random_comic",
                "now => @com.xkcd.random_comic() => notify;",
            ),
            (
                Stage::Action,
                "com.twitter",
                "post",
                "now => @com.twitter.post();",
            ),
        ];
        let fragments = ["monitor", "random_comic", "@com.twitter"];

        for (i, (stage, kind, function, expected)) in cases.into_iter().enumerate() {
            let session = create_session();
            select(&session, stage, kind, function);
            let preview = session.preview();
            assert_eq!(preview, expected);

            for (j, fragment) in fragments.iter().enumerate() {
                if i != j {
                    assert!(
                        !preview.contains(fragment),
                        "{stage} preview leaked '{fragment}': {preview}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_action_only_command() {
        let session = create_session();
        select(&session, Stage::Action, "org.thingpedia.light", "blink");

        assert_eq!(session.preview(), "now => @org.thingpedia.light.blink();");
        assert_eq!(
            session.component_preview(Stage::Action),
            "@org.thingpedia.light.blink()"
        );
        assert!(session.render_input_form().unwrap().rows.is_empty());
    }

    #[test]
    fn test_stream_and_query_join() {
        let session = create_session();
        select(&session, Stage::Stream, "com.xkcd", "get_comic");
        select(&session, Stage::Query, "com.news", "get_article");
        select(&session, Stage::Action, "com.twitter", "post");

        assert_eq!(
            session.preview(),
            "(monitor (@com.xkcd.get_comic())) join (@com.news.get_article()) => @com.twitter.post();"
        );

        session.clear_stage(Stage::Query);
        assert_eq!(
            session.preview(),
            "monitor (@com.xkcd.get_comic()) => @com.twitter.post();"
        );
        assert_eq!(session.component_preview(Stage::Query), "");
    }

    #[test]
    fn test_reselecting_replaces_stage() {
        let session = create_session();
        select(&session, Stage::Action, "com.twitter", "post");
        select(&session, Stage::Action, "org.thingpedia.light", "blink");

        let preview = session.preview();
        assert_eq!(preview, "now => @org.thingpedia.light.blink();");
        assert!(!preview.contains("twitter"));
    }

    #[test]
    fn test_clear_everything_restores_placeholder() {
        let session = create_session();
        select(&session, Stage::Stream, "com.xkcd", "get_comic");
        session.clear_stage(Stage::Stream);
        assert_eq!(session.preview(), NOTHING_SELECTED);
    }
}

#[cfg(test)]
mod function_picker_tests {
    use super::*;

    #[test]
    fn test_stream_only_offers_monitorable_queries() {
        let session = create_session();
        session.start_stage(Stage::Stream);
        let functions = tokio_test::block_on(session.select_device("com.xkcd"))
            .unwrap()
            .current()
            .unwrap();

        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].name, "get_comic");
        assert_eq!(functions[0].label, "when xkcd comic changes");
    }

    #[test]
    fn test_query_offers_every_query() {
        let session = create_session();
        session.start_stage(Stage::Query);
        let functions = tokio_test::block_on(session.select_device("com.xkcd"))
            .unwrap()
            .current()
            .unwrap();

        let labels: Vec<_> = functions.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["get xkcd comic", "get random xkcd comic"]);
        assert_eq!(
            session.with_builder(|b| b.function_hint()),
            Some(thingtalk_builder::builder::CHOOSE_FUNCTION)
        );
    }

    #[test]
    fn test_device_without_compatible_function() {
        let session = create_session();
        session.start_stage(Stage::Action);
        let functions = tokio_test::block_on(session.select_device("com.xkcd"))
            .unwrap()
            .current()
            .unwrap();

        assert!(functions.is_empty());
        assert_eq!(
            session.with_builder(|b| b.function_hint()),
            Some(thingtalk_builder::builder::NO_COMPATIBLE_FUNCTION)
        );
    }

    #[test]
    fn test_selecting_incompatible_function_fails() {
        let session = create_session();
        session.start_stage(Stage::Stream);
        tokio_test::block_on(session.select_device("com.xkcd")).unwrap();

        let err = session.select_function("random_comic").unwrap_err();
        assert!(matches!(
            err,
            SessionError::Builder(BuilderError::UnknownFunction { .. })
        ));
        assert_eq!(session.preview(), NOTHING_SELECTED);

        // The picker stays open after a failed pick.
        session.select_function("get_comic").unwrap();
        assert_eq!(session.preview(), "monitor (@com.xkcd.get_comic()) => notify;");
    }

    #[test]
    fn test_selecting_function_closes_picker() {
        let session = create_session();
        select(&session, Stage::Query, "com.news", "get_article");

        assert!(session.with_builder(|b| b.function_candidates().is_empty()));
        assert!(session.with_builder(|b| b.function_hint().is_none()));
        assert!(matches!(
            session.select_function("get_article"),
            Err(SessionError::Builder(BuilderError::NoDeviceSelected))
        ));
    }

    #[test]
    fn test_operations_need_an_active_stage() {
        let session = create_session();
        assert!(matches!(
            session.render_input_form(),
            Err(SessionError::Builder(BuilderError::NoActiveStage))
        ));

        session.start_stage(Stage::Query);
        assert!(matches!(
            session.render_input_form(),
            Err(SessionError::Builder(BuilderError::NoFunctionSelected(Stage::Query)))
        ));
    }
}

#[cfg(test)]
mod input_tests {
    use super::*;

    #[test]
    fn test_number_input() {
        let session = create_session();
        select(&session, Stage::Query, "com.xkcd", "get_comic");

        let form = session.render_input_form().unwrap();
        assert_eq!(form.kind, FormKind::Input);
        assert_eq!(form.rows.len(), 1);
        let row = form.row("number").unwrap();
        assert_eq!(row.editor.id(), "thingtalk-input-value-number");
        assert_eq!(row.operator_labels(), vec!["="]);

        let applied = session
            .apply_input_values(&FormSubmission::new().value("number", "42"))
            .unwrap();
        assert!(applied);
        assert_eq!(
            session.preview(),
            "now => @com.xkcd.get_comic(number=42) => notify;"
        );
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let session = create_session();
        select(&session, Stage::Query, "com.xkcd", "get_comic");

        let err = session
            .apply_input_values(&FormSubmission::new().value("number", "forty-two"))
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Builder(BuilderError::InvalidNumber { .. })
        ));
        assert_eq!(session.preview(), "now => @com.xkcd.get_comic() => notify;");
    }

    #[test]
    fn test_inexact_numbers_are_rejected() {
        let session = create_session();
        select(&session, Stage::Query, "com.xkcd", "get_comic");

        for raw in ["99999999999999999999", "1e3", "9007199254740993"] {
            let err = session
                .apply_input_values(&FormSubmission::new().value("number", raw))
                .unwrap_err();
            assert!(
                matches!(err, SessionError::Builder(BuilderError::InvalidNumber { .. })),
                "{raw} was accepted"
            );
        }
        assert_eq!(session.preview(), "now => @com.xkcd.get_comic() => notify;");

        session
            .apply_input_values(&FormSubmission::new().value("number", "9007199254740991"))
            .unwrap();
        assert_eq!(
            session.preview(),
            "now => @com.xkcd.get_comic(number=9007199254740991) => notify;"
        );
    }

    #[test]
    fn test_empty_submission_leaves_stage_untouched() {
        let session = create_session();
        select(&session, Stage::Query, "com.xkcd", "get_comic");
        session
            .apply_input_values(&FormSubmission::new().value("number", "7"))
            .unwrap();

        let applied = session
            .apply_input_values(&FormSubmission::new().value("number", ""))
            .unwrap();
        assert!(!applied);
        assert_eq!(
            session.preview(),
            "now => @com.xkcd.get_comic(number=7) => notify;"
        );
    }

    #[test]
    fn test_location_enum_and_entity_inputs() {
        let session = create_session();
        select(&session, Stage::Stream, "org.weather", "current");
        session
            .apply_input_values(&FormSubmission::new().value("location", "$home"))
            .unwrap();

        select(&session, Stage::Action, "org.thingpedia.light", "set_power");
        session
            .apply_input_values(&FormSubmission::new().value("power", "on"))
            .unwrap();

        assert_eq!(
            session.preview(),
            "monitor (@org.weather.current(location=$context.location.home)) => @org.thingpedia.light.set_power(power=enum(on));"
        );

        select(&session, Stage::Action, "com.twitter", "follow");
        session
            .apply_input_values(&FormSubmission::new().value("user", "bob"))
            .unwrap();
        assert_eq!(
            session.component_preview(Stage::Action),
            r#"@com.twitter.follow(user="bob"^^tt:username)"#
        );
    }

    #[test]
    fn test_enum_must_be_declared() {
        let session = create_session();
        select(&session, Stage::Action, "org.thingpedia.light", "set_power");

        let err = session
            .apply_input_values(&FormSubmission::new().value("power", "dim"))
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Builder(BuilderError::InvalidEnum { .. })
        ));
    }

    #[test]
    fn test_absolute_location_is_rejected() {
        let session = create_session();
        select(&session, Stage::Stream, "org.weather", "current");

        let err = session
            .apply_input_values(&FormSubmission::new().value("location", "Palo Alto"))
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Builder(BuilderError::UnsupportedLocation { .. })
        ));
    }

    #[test]
    fn test_unsupported_input_type() {
        let session = create_session();
        select(&session, Stage::Action, "org.thingpedia.light", "schedule");

        let form = session.render_input_form().unwrap();
        let row = form.row("when").unwrap();
        assert!(!row.editor.is_enabled());
        assert!(matches!(row.editor, FieldEditor::Unsupported { .. }));

        let err = session
            .apply_input_values(&FormSubmission::new().value("when", "tomorrow"))
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Builder(BuilderError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn test_value_resolution() {
        let number = resolve_value("n", &Type::Number, "42", false).unwrap();
        assert_eq!(number.to_string(), "42");

        let t = resolve_value("b", &Type::Boolean, "true", false).unwrap();
        let f = resolve_value("b", &Type::Boolean, "false", false).unwrap();
        assert_eq!(t, Value::Boolean(true));
        assert_eq!(f, Value::Boolean(false));

        let upstream = resolve_value("n", &Type::Number, "count", true).unwrap();
        assert_eq!(upstream, Value::VarRef("count".to_string()));
    }
}

#[cfg(test)]
mod parameter_passing_tests {
    use super::*;

    #[test]
    fn test_stream_output_feeds_action() {
        let session = create_session();
        select(&session, Stage::Stream, "com.xkcd", "get_comic");
        select(&session, Stage::Action, "com.twitter", "post");

        let form = session.render_input_form().unwrap();
        let row = form.row("status").unwrap();
        let candidates = row.editor.candidates();
        assert!(matches!(row.editor, FieldEditor::Combo { .. }));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "title");
        assert_eq!(candidates[0].label, "Use title from when xkcd comic changes");
        assert_eq!(candidates[0].source, Stage::Stream);

        session
            .apply_input_values(&FormSubmission::new().upstream("status", "title"))
            .unwrap();

        let param_value = session.with_builder(|b| {
            b.action()
                .and_then(Action::invocation)
                .map(|inv| inv.in_params[0].value.clone())
        });
        assert_eq!(param_value, Some(Value::VarRef("title".to_string())));
        assert_eq!(
            session.preview(),
            "monitor (@com.xkcd.get_comic()) => @com.twitter.post(status=title);"
        );
    }

    #[test]
    fn test_query_names_win_over_stream_names() {
        let session = create_session();
        select(&session, Stage::Stream, "com.xkcd", "get_comic");
        select(&session, Stage::Query, "com.news", "get_article");
        session.start_stage(Stage::Action);

        let candidates = session.parameter_passing_candidates(&Type::String);
        let names: Vec<_> = candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["title", "summary"]);
        assert!(candidates.iter().all(|c| c.source == Stage::Query));
        assert_eq!(candidates[0].label, "Use title from get news article");

        let entities = session.parameter_passing_candidates(&Type::Entity("tt:url".into()));
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].name, "link");
        assert_eq!(entities[0].source, Stage::Stream);
    }

    #[test]
    fn test_stream_sees_no_candidates() {
        let session = create_session();
        select(&session, Stage::Query, "com.news", "get_article");
        select(&session, Stage::Stream, "com.xkcd", "get_comic");

        assert!(session.parameter_passing_candidates(&Type::String).is_empty());
        let form = session.render_input_form().unwrap();
        assert!(matches!(
            form.row("number").unwrap().editor,
            FieldEditor::Text { .. }
        ));
    }

    #[test]
    fn test_query_sees_stream_outputs_only() {
        let session = create_session();
        select(&session, Stage::Stream, "org.weather", "current");
        select(&session, Stage::Query, "com.news", "get_article");

        let candidates = session.parameter_passing_candidates(&Type::String);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "summary");
        assert_eq!(candidates[0].source, Stage::Stream);
    }

    #[test]
    fn test_cleared_stage_stops_offering_outputs() {
        let session = create_session();
        select(&session, Stage::Stream, "com.xkcd", "get_comic");
        session.clear_stage(Stage::Stream);
        session.start_stage(Stage::Action);

        assert!(session.parameter_passing_candidates(&Type::String).is_empty());
    }
}

#[cfg(test)]
mod filter_tests {
    use super::*;

    fn weather_stream() -> Session<StaticCatalog> {
        let session = create_session();
        select(&session, Stage::Stream, "org.weather", "current");
        session.start_stage(Stage::Stream);
        session
    }

    #[test]
    fn test_filter_form_rows() {
        let session = weather_stream();
        let form = session.render_filter_form().unwrap();

        let names: Vec<_> = form.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["temperature", "status", "humidity", "summary"]);
        assert_eq!(
            form.row("humidity").unwrap().operator_labels(),
            vec!["==", ">=", "<="]
        );
        assert_eq!(form.row("summary").unwrap().operator_labels(), vec!["contains"]);
        assert_eq!(form.row("status").unwrap().operator_labels(), vec!["=="]);
        assert_eq!(
            form.row("status").unwrap().editor.id(),
            "thingtalk-filter-value-status"
        );
        assert!(!form.row("temperature").unwrap().editor.is_enabled());
    }

    #[test]
    fn test_no_filter_leaves_stage_unfiltered() {
        let session = weather_stream();
        let filter = session.apply_filters(&FormSubmission::new()).unwrap();

        assert!(filter.is_none());
        assert_eq!(session.preview(), "monitor (@org.weather.current()) => notify;");
    }

    #[test]
    fn test_single_filter_is_one_atom() {
        let session = weather_stream();
        let filter = session
            .apply_filters(&FormSubmission::new().filter(
                "humidity",
                ComparisonOp::GreaterThanOrEqual,
                "80",
            ))
            .unwrap();

        assert_eq!(
            filter,
            Some(BooleanExpression::atom(
                "humidity",
                ComparisonOp::GreaterThanOrEqual,
                Value::Number(80.0)
            ))
        );
        assert_eq!(
            session.preview(),
            "edge (monitor (@org.weather.current())) on humidity >= 80 => notify;"
        );
    }

    #[test]
    fn test_many_filters_follow_form_order() {
        let session = weather_stream();
        let submission = FormSubmission::new()
            .value("summary", "rain")
            .filter("humidity", ComparisonOp::SmallerThanOrEqual, "30")
            .value("status", "sunny");
        let filter = session.apply_filters(&submission).unwrap();

        let Some(BooleanExpression::And(atoms)) = filter else {
            panic!("Expected a conjunction, got {:?}", filter);
        };
        assert_eq!(
            atoms,
            vec![
                BooleanExpression::atom(
                    "status",
                    ComparisonOp::Equal,
                    Value::Enum("sunny".to_string())
                ),
                BooleanExpression::atom(
                    "humidity",
                    ComparisonOp::SmallerThanOrEqual,
                    Value::Number(30.0)
                ),
                BooleanExpression::atom(
                    "summary",
                    ComparisonOp::Contains,
                    Value::String("rain".to_string())
                ),
            ]
        );
        assert_eq!(
            session.component_preview(Stage::Stream),
            r#"edge (monitor (@org.weather.current())) on (status == enum(sunny) && humidity <= 30 && summary =~ "rain")"#
        );
    }

    #[test]
    fn test_query_filter() {
        let session = create_session();
        select(&session, Stage::Query, "com.news", "get_article");
        session.start_stage(Stage::Query);
        session
            .apply_filters(&FormSubmission::new().filter(
                "rank",
                ComparisonOp::SmallerThanOrEqual,
                "3",
            ))
            .unwrap();

        assert_eq!(
            session.preview(),
            "now => (@com.news.get_article()), rank <= 3 => notify;"
        );
    }

    #[test]
    fn test_filter_with_upstream_value() {
        let session = create_session();
        select(&session, Stage::Stream, "org.weather", "current");
        select(&session, Stage::Query, "com.news", "get_article");
        session.start_stage(Stage::Query);

        let form = session.render_filter_form().unwrap();
        let candidates = form.row("summary").unwrap().editor.candidates();
        assert_eq!(candidates[0].name, "summary");

        session
            .apply_filters(&FormSubmission::new().upstream("summary", "summary"))
            .unwrap();
        assert_eq!(
            session.component_preview(Stage::Query),
            "(@com.news.get_article()), summary =~ summary"
        );
    }

    #[test]
    fn test_operator_must_fit_type() {
        let session = weather_stream();
        let err = session
            .apply_filters(&FormSubmission::new().filter(
                "humidity",
                ComparisonOp::Contains,
                "80",
            ))
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Builder(BuilderError::UnknownOperator { .. })
        ));
    }

    #[test]
    fn test_unsupported_filter_type() {
        let session = weather_stream();
        let err = session
            .apply_filters(&FormSubmission::new().value("temperature", "20"))
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Builder(BuilderError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn test_actions_cannot_be_filtered() {
        let session = create_session();
        select(&session, Stage::Action, "com.twitter", "post");
        session.start_stage(Stage::Action);

        assert!(matches!(
            session.render_filter_form(),
            Err(SessionError::Builder(BuilderError::NotFilterable(Stage::Action)))
        ));
    }
}
