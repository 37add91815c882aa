mod common;

use chillax_core::{
    make_comment, Article, Comment, CommentLinkError, RepoError, Repository, Tag, User,
};
use common::{
    date, empty_backends, populated_backends, populated_memory_repo, populated_sqlite_repo,
    timestamp,
};

#[test]
fn added_user_can_be_retrieved() {
    for (backend, mut repo) in populated_backends() {
        repo.add_user(&User::new("Dave", "123456789")).unwrap();

        let user = repo.get_user("Dave").unwrap().expect(backend);
        assert_eq!(user.username, "Dave", "{backend}");
        assert_eq!(user.password, "123456789", "{backend}");
    }
}

#[test]
fn unknown_user_is_none() {
    for (backend, repo) in populated_backends() {
        assert!(repo.get_user("prince").unwrap().is_none(), "{backend}");
    }
}

#[test]
fn username_lookup_is_exact() {
    for (backend, repo) in populated_backends() {
        assert!(repo.get_user("fmercury").unwrap().is_some(), "{backend}");
        assert!(repo.get_user("FMercury").unwrap().is_none(), "{backend}");
    }
}

#[test]
fn populated_catalog_counts() {
    for (backend, repo) in populated_backends() {
        assert_eq!(repo.get_number_of_articles().unwrap(), 10, "{backend}");
        assert_eq!(repo.get_tags().unwrap().len(), 14, "{backend}");
        assert_eq!(repo.get_comments().unwrap().len(), 3, "{backend}");
    }
}

#[test]
fn article_can_be_retrieved_with_tags_and_comments() {
    for (backend, repo) in populated_backends() {
        let article = repo.get_article(1).unwrap().expect(backend);
        assert_eq!(article.title, "Guardians of the Galaxy", "{backend}");
        assert_eq!(article.date, date("2014-08-01"), "{backend}");
        assert!(article.is_tagged_by("Sci-Fi"), "{backend}");
        assert!(article.is_tagged_by("Action"), "{backend}");
        assert!(!article.is_tagged_by("Horror"), "{backend}");
        assert_eq!(article.number_of_comments(), 2, "{backend}");
    }
}

#[test]
fn missing_article_is_none() {
    for (backend, repo) in populated_backends() {
        assert!(repo.get_article(101).unwrap().is_none(), "{backend}");
    }
}

#[test]
fn added_article_is_counted_and_retrievable() {
    for (backend, mut repo) in populated_backends() {
        let mut article = Article::new(
            date("2020-03-15"),
            "Coronavirus: First case of virus in New Zealand",
            "The first case of coronavirus has been confirmed in New Zealand.",
            "https://www.stuff.co.nz/national/health/119899280",
            "https://resources.stuff.co.nz/content/dam/images/4/y/p/0/b/image.jpg",
            11,
        );
        article.add_tag("Documentary");
        repo.add_article(&article).unwrap();

        assert_eq!(repo.get_number_of_articles().unwrap(), 11, "{backend}");
        let stored = repo.get_article(11).unwrap().expect(backend);
        assert_eq!(stored.title, article.title, "{backend}");
        assert_eq!(repo.get_article_ids_for_tag("Documentary").unwrap(), vec![11], "{backend}");
        assert_eq!(repo.get_last_article().unwrap().unwrap().id, 11, "{backend}");
    }
}

#[test]
fn re_adding_article_replaces_fields_and_tags() {
    for (backend, mut repo) in populated_backends() {
        let mut article = repo.get_article(7).unwrap().expect(backend);
        article.title = "La La Land (2016)".to_string();
        article.tags.clear();
        article.add_tag("Musical");
        repo.add_article(&article).unwrap();

        assert_eq!(repo.get_number_of_articles().unwrap(), 10, "{backend}");
        let stored = repo.get_article(7).unwrap().expect(backend);
        assert_eq!(stored.title, "La La Land (2016)", "{backend}");
        assert!(stored.is_tagged_by("Musical"), "{backend}");
        assert!(!stored.is_tagged_by("Comedy"), "{backend}");
        assert_eq!(repo.get_article_ids_for_tag("Comedy").unwrap(), vec![4, 8], "{backend}");
    }
}

#[test]
fn articles_by_date_are_ordered_by_id() {
    for (backend, repo) in populated_backends() {
        let ids: Vec<i64> = repo
            .get_articles_by_date(date("2016-12-21"))
            .unwrap()
            .iter()
            .map(|article| article.id)
            .collect();
        assert_eq!(ids, vec![4, 10], "{backend}");
        assert!(repo
            .get_articles_by_date(date("2020-01-01"))
            .unwrap()
            .is_empty());
    }
}

#[test]
fn first_and_last_articles_follow_date_order() {
    for (backend, repo) in populated_backends() {
        let first = repo.get_first_article().unwrap().expect(backend);
        let last = repo.get_last_article().unwrap().expect(backend);
        assert_eq!(first.title, "Prometheus", "{backend}");
        assert_eq!(last.title, "Mindhorn", "{backend}");
    }
}

#[test]
fn first_and_last_are_none_when_empty() {
    for (backend, repo) in empty_backends() {
        assert!(repo.get_first_article().unwrap().is_none(), "{backend}");
        assert!(repo.get_last_article().unwrap().is_none(), "{backend}");
        assert_eq!(repo.get_number_of_articles().unwrap(), 0, "{backend}");
    }
}

#[test]
fn articles_by_id_keep_input_order_and_skip_misses() {
    for (backend, repo) in populated_backends() {
        let ids: Vec<i64> = repo
            .get_articles_by_id(&[6, 2, 5])
            .unwrap()
            .iter()
            .map(|article| article.id)
            .collect();
        assert_eq!(ids, vec![6, 2, 5], "{backend}");

        let partial = repo.get_articles_by_id(&[2, 99]).unwrap();
        assert_eq!(partial.len(), 1, "{backend}");
        assert_eq!(partial[0].id, 2, "{backend}");

        assert!(repo.get_articles_by_id(&[]).unwrap().is_empty(), "{backend}");
    }
}

#[test]
fn article_ids_for_tag() {
    for (backend, repo) in populated_backends() {
        assert_eq!(
            repo.get_article_ids_for_tag("Adventure").unwrap(),
            vec![1, 2, 5, 6, 9, 10],
            "{backend}"
        );
        assert_eq!(repo.get_article_ids_for_tag("Horror").unwrap(), vec![3], "{backend}");
        assert!(repo.get_article_ids_for_tag("Western").unwrap().is_empty(), "{backend}");
    }
}

#[test]
fn previous_and_next_dates_are_positional() {
    for (backend, repo) in populated_backends() {
        let sing = repo.get_article(4).unwrap().expect(backend);
        let passengers = repo.get_article(10).unwrap().expect(backend);
        let great_wall = repo.get_article(6).unwrap().expect(backend);

        assert_eq!(
            repo.get_date_of_previous_article(&passengers).unwrap(),
            Some(date("2016-12-21")),
            "{backend}"
        );
        assert_eq!(
            repo.get_date_of_next_article(&sing).unwrap(),
            Some(date("2016-12-21")),
            "{backend}"
        );
        assert_eq!(
            repo.get_date_of_previous_article(&sing).unwrap(),
            Some(date("2016-12-16")),
            "{backend}"
        );
        assert_eq!(
            repo.get_date_of_next_article(&great_wall).unwrap(),
            Some(date("2016-12-21")),
            "{backend}"
        );
    }
}

#[test]
fn boundary_articles_have_no_neighbour() {
    for (backend, repo) in populated_backends() {
        let first = repo.get_first_article().unwrap().expect(backend);
        let last = repo.get_last_article().unwrap().expect(backend);

        assert!(repo.get_date_of_previous_article(&first).unwrap().is_none(), "{backend}");
        assert!(repo.get_date_of_next_article(&last).unwrap().is_none(), "{backend}");
    }
}

#[test]
fn tags_are_sorted_by_name_with_ascending_article_ids() {
    for (backend, repo) in populated_backends() {
        let tags = repo.get_tags().unwrap();
        let names: Vec<&str> = tags.iter().map(|tag| tag.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted, "{backend}");

        let comedy = tags.iter().find(|tag| tag.name == "Comedy").expect(backend);
        let ids: Vec<i64> = comedy.articles.iter().copied().collect();
        assert_eq!(ids, vec![4, 7, 8], "{backend}");
    }
}

#[test]
fn added_tag_links_only_stored_articles() {
    for (backend, mut repo) in populated_backends() {
        let mut tag = Tag::new("Space");
        tag.add_article(2);
        tag.add_article(404);
        repo.add_tag(&tag).unwrap();

        assert_eq!(repo.get_tags().unwrap().len(), 15, "{backend}");
        assert_eq!(repo.get_article_ids_for_tag("Space").unwrap(), vec![2], "{backend}");
        let prometheus = repo.get_article(2).unwrap().expect(backend);
        assert!(prometheus.is_tagged_by("Space"), "{backend}");
    }
}

#[test]
fn linked_comment_is_stored_in_insertion_order() {
    for (backend, mut repo) in populated_backends() {
        let mut user = repo.get_user("thorke").unwrap().expect(backend);
        let mut article = repo.get_article(2).unwrap().expect(backend);
        let comment = make_comment(
            "Prometheus is worth a rewatch",
            &mut user,
            &mut article,
            timestamp("2020-02-28 14:31:26"),
        );
        repo.add_comment(&comment, &user, &article).unwrap();

        let comments = repo.get_comments().unwrap();
        assert_eq!(comments.len(), 4, "{backend}");
        assert_eq!(comments.last(), Some(&comment), "{backend}");

        let stored_article = repo.get_article(2).unwrap().expect(backend);
        assert!(stored_article.has_comment(comment.id), "{backend}");
        let stored_user = repo.get_user("thorke").unwrap().expect(backend);
        assert!(stored_user.has_comment(comment.id), "{backend}");
    }
}

#[test]
fn comment_without_back_links_is_rejected() {
    for (backend, mut repo) in populated_backends() {
        let user = repo.get_user("thorke").unwrap().expect(backend);
        let article = repo.get_article(2).unwrap().expect(backend);
        let comment = Comment::new(
            Some(&user),
            Some(&article),
            "Nobody else saw this",
            timestamp("2020-02-28 14:31:26"),
        );

        let err = repo.add_comment(&comment, &user, &article).unwrap_err();
        assert!(
            matches!(
                err,
                RepoError::UnlinkedComment(CommentLinkError::NotInUserComments { .. })
            ),
            "{backend}: {err}"
        );
        assert_eq!(repo.get_comments().unwrap().len(), 3, "{backend}");
    }
}

#[test]
fn comment_for_unstored_user_is_rejected() {
    for (backend, mut repo) in populated_backends() {
        let mut user = User::new("gmichael", "hash");
        let mut article = repo.get_article(2).unwrap().expect(backend);
        let comment = make_comment(
            "Careless whisper",
            &mut user,
            &mut article,
            timestamp("2020-02-28 14:31:26"),
        );

        let err = repo.add_comment(&comment, &user, &article).unwrap_err();
        assert!(
            matches!(
                err,
                RepoError::UnlinkedComment(CommentLinkError::UserNotStored(_))
            ),
            "{backend}: {err}"
        );
        assert_eq!(repo.get_comments().unwrap().len(), 3, "{backend}");
        let stored_article = repo.get_article(2).unwrap().expect(backend);
        assert_eq!(stored_article.number_of_comments(), 0, "{backend}");
    }
}

#[test]
fn backends_agree_on_populated_catalog() {
    let memory = populated_memory_repo();
    let sqlite = populated_sqlite_repo();

    assert_eq!(
        memory.get_number_of_articles().unwrap(),
        sqlite.get_number_of_articles().unwrap()
    );
    assert_eq!(
        memory.get_first_article().unwrap().map(|article| article.id),
        sqlite.get_first_article().unwrap().map(|article| article.id)
    );
    assert_eq!(
        memory.get_last_article().unwrap().map(|article| article.id),
        sqlite.get_last_article().unwrap().map(|article| article.id)
    );
    for id in 1..=10 {
        let left = memory.get_article(id).unwrap().unwrap();
        let right = sqlite.get_article(id).unwrap().unwrap();
        assert_eq!(left.date, right.date, "article {id}");
        assert_eq!(left.title, right.title, "article {id}");
        assert_eq!(left.first_para, right.first_para, "article {id}");
        assert_eq!(left.tags, right.tags, "article {id}");
        assert_eq!(
            left.number_of_comments(),
            right.number_of_comments(),
            "article {id}"
        );
    }

    let memory_tags: Vec<(String, Vec<i64>)> = memory
        .get_tags()
        .unwrap()
        .into_iter()
        .map(|tag| (tag.name, tag.articles.into_iter().collect()))
        .collect();
    let sqlite_tags: Vec<(String, Vec<i64>)> = sqlite
        .get_tags()
        .unwrap()
        .into_iter()
        .map(|tag| (tag.name, tag.articles.into_iter().collect()))
        .collect();
    assert_eq!(memory_tags, sqlite_tags);

    let memory_comments: Vec<_> = memory
        .get_comments()
        .unwrap()
        .into_iter()
        .map(|comment| (comment.user, comment.article, comment.text, comment.timestamp))
        .collect();
    let sqlite_comments: Vec<_> = sqlite
        .get_comments()
        .unwrap()
        .into_iter()
        .map(|comment| (comment.user, comment.article, comment.text, comment.timestamp))
        .collect();
    assert_eq!(memory_comments, sqlite_comments);
}

#[test]
fn comment_for_unstored_article_is_rejected() {
    for (backend, mut repo) in populated_backends() {
        let mut user = repo.get_user("thorke").unwrap().expect(backend);
        let mut article = Article::new(date("2020-03-15"), "Unreleased", "", "", "", 404);
        let comment = make_comment(
            "Not out yet",
            &mut user,
            &mut article,
            timestamp("2020-03-15 10:00:00"),
        );

        let err = repo.add_comment(&comment, &user, &article).unwrap_err();
        assert!(
            matches!(
                err,
                RepoError::UnlinkedComment(CommentLinkError::ArticleNotStored(404))
            ),
            "{backend}: {err}"
        );
        assert_eq!(repo.get_comments().unwrap().len(), 3, "{backend}");
        let stored_user = repo.get_user("thorke").unwrap().expect(backend);
        assert!(!stored_user.has_comment(comment.id), "{backend}");
    }
}

#[test]
fn comment_without_user_is_rejected() {
    for (backend, mut repo) in populated_backends() {
        let user = repo.get_user("thorke").unwrap().expect(backend);
        let mut article = repo.get_article(2).unwrap().expect(backend);
        let comment = Comment::new(
            None,
            Some(&article),
            "Anonymous",
            timestamp("2020-02-28 14:31:26"),
        );
        article.add_comment(comment.id);

        let err = repo.add_comment(&comment, &user, &article).unwrap_err();
        assert!(
            matches!(err, RepoError::UnlinkedComment(CommentLinkError::UserUnset(_))),
            "{backend}: {err}"
        );
        assert_eq!(repo.get_comments().unwrap().len(), 3, "{backend}");
    }
}

#[test]
fn comment_missing_from_article_collection_is_rejected() {
    for (backend, mut repo) in populated_backends() {
        let mut user = repo.get_user("thorke").unwrap().expect(backend);
        let article = repo.get_article(2).unwrap().expect(backend);
        let comment = Comment::new(
            Some(&user),
            Some(&article),
            "Half linked",
            timestamp("2020-02-28 14:31:26"),
        );
        user.add_comment(comment.id);

        let err = repo.add_comment(&comment, &user, &article).unwrap_err();
        assert!(
            matches!(
                err,
                RepoError::UnlinkedComment(CommentLinkError::NotInArticleComments { .. })
            ),
            "{backend}: {err}"
        );
        assert_eq!(repo.get_comments().unwrap().len(), 3, "{backend}");
        let stored_user = repo.get_user("thorke").unwrap().expect(backend);
        assert!(!stored_user.has_comment(comment.id), "{backend}");
    }
}

#[test]
fn stored_comment_cannot_move_to_another_user() {
    for (backend, mut repo) in populated_backends() {
        let mut author = repo.get_user("thorke").unwrap().expect(backend);
        let mut article = repo.get_article(2).unwrap().expect(backend);
        let original = make_comment(
            "First take",
            &mut author,
            &mut article,
            timestamp("2020-02-28 14:31:26"),
        );
        repo.add_comment(&original, &author, &article).unwrap();

        let mut other = repo.get_user("mjackson").unwrap().expect(backend);
        let mut article = repo.get_article(2).unwrap().expect(backend);
        let moved = Comment::with_id(
            original.id,
            Some(other.username.clone()),
            Some(article.id),
            "Second take",
            timestamp("2020-02-29 09:00:00"),
        );
        other.add_comment(moved.id);
        article.add_comment(moved.id);

        let err = repo.add_comment(&moved, &other, &article).unwrap_err();
        assert!(
            matches!(
                err,
                RepoError::UnlinkedComment(CommentLinkError::OwnerChanged(id)) if id == original.id
            ),
            "{backend}: {err}"
        );

        let comments = repo.get_comments().unwrap();
        assert_eq!(comments.len(), 4, "{backend}");
        assert_eq!(comments.last(), Some(&original), "{backend}");
        let author = repo.get_user("thorke").unwrap().expect(backend);
        assert!(author.has_comment(original.id), "{backend}");
        let other = repo.get_user("mjackson").unwrap().expect(backend);
        assert!(!other.has_comment(original.id), "{backend}");
    }
}

#[test]
fn stored_comment_cannot_move_to_another_article() {
    for (backend, mut repo) in populated_backends() {
        let mut user = repo.get_user("thorke").unwrap().expect(backend);
        let mut article = repo.get_article(2).unwrap().expect(backend);
        let original = make_comment(
            "Wrong film",
            &mut user,
            &mut article,
            timestamp("2020-02-28 14:31:26"),
        );
        repo.add_comment(&original, &user, &article).unwrap();

        let mut target = repo.get_article(3).unwrap().expect(backend);
        let moved = Comment::with_id(
            original.id,
            Some(user.username.clone()),
            Some(target.id),
            "Wrong film",
            original.timestamp,
        );
        target.add_comment(moved.id);

        let err = repo.add_comment(&moved, &user, &target).unwrap_err();
        assert!(
            matches!(
                err,
                RepoError::UnlinkedComment(CommentLinkError::OwnerChanged(_))
            ),
            "{backend}: {err}"
        );
        let split = repo.get_article(3).unwrap().expect(backend);
        assert_eq!(split.number_of_comments(), 1, "{backend}");
    }
}

#[test]
fn re_adding_comment_with_same_owner_replaces_text() {
    for (backend, mut repo) in populated_backends() {
        let mut user = repo.get_user("thorke").unwrap().expect(backend);
        let mut article = repo.get_article(2).unwrap().expect(backend);
        let mut comment = make_comment(
            "Typo in thsi",
            &mut user,
            &mut article,
            timestamp("2020-02-28 14:31:26"),
        );
        repo.add_comment(&comment, &user, &article).unwrap();

        comment.text = "Typo in this".to_string();
        repo.add_comment(&comment, &user, &article).unwrap();

        let comments = repo.get_comments().unwrap();
        assert_eq!(comments.len(), 4, "{backend}");
        assert_eq!(comments[3].text, "Typo in this", "{backend}");
        let stored = repo.get_article(2).unwrap().expect(backend);
        assert_eq!(stored.number_of_comments(), 1, "{backend}");
        let stored_user = repo.get_user("thorke").unwrap().expect(backend);
        assert_eq!(stored_user.comments.len(), 2, "{backend}");
    }
}
