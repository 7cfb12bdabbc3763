use folio::{
    cluster_exemplars, clustering_stats, similar_books, Book, BookSource, ClusterConfig,
    MemoryShelf, Orchestrator, Scorer, Weights,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Minimal end-to-end: books -> clusters + layout -> recommendations.
    //
    // It intentionally stays small: it exists primarily to validate that the
    // integration path builds and runs. Set RUST_LOG=debug to watch the
    // optimal-k search.
    env_logger::init();

    // Three synthetic "topics" in 8 dimensions. Real embeddings come from an
    // external model; the geometry is all the engine cares about.
    let topics: [(&str, [f32; 8]); 3] = [
        ("space-opera", [9.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
        ("cozy-mystery", [0.0, 0.0, 9.0, 1.0, 0.0, 0.0, 0.0, 0.0]),
        ("field-guide", [0.0, 0.0, 0.0, 0.0, 9.0, 1.0, 0.0, 0.0]),
    ];

    let mut shelf = MemoryShelf::new();
    for (t, (genre, center)) in topics.iter().enumerate() {
        for i in 0..7 {
            let mut v = *center;
            v[6] = i as f32 * 0.1;
            v[7] = (i % 3) as f32 * 0.1;
            let id = format!("{genre}-{i}");
            let mut book = Book::new(id.as_str(), format!("Book {id}"), format!("Author {t}"))
                .with_embedding(&v)
                .with_rating(((t + i) % 5 + 1) as u8);
            book.genres = Some(genre.to_string());
            shelf.insert(book);
        }
    }

    let config = ClusterConfig {
        min_k: 2,
        max_k: 6,
        n_neighbors: 5,
        ..Default::default()
    };
    let mut orchestrator = Orchestrator::new(shelf.clone(), shelf).with_config(config);
    let summary = orchestrator.run();

    println!(
        "success={} k={:?} updated={}/{}",
        summary.success, summary.optimal_k, summary.updated_books, summary.total_books
    );
    for (cluster, count) in &summary.cluster_sizes {
        println!("  cluster {cluster}: {count} books");
    }

    let shelf = orchestrator.into_sink();
    let books = shelf.books();

    let stats = clustering_stats(&books);
    println!(
        "clustered {}/{} books ({}%)",
        stats.clustered_books, stats.total_books, stats.clustering_rate
    );

    for cluster in stats.cluster_sizes.keys() {
        let exemplars = cluster_exemplars(&books, *cluster, 2);
        let titles: Vec<&str> = exemplars.iter().map(|e| e.title.as_str()).collect();
        println!("  cluster {cluster} exemplars: {titles:?}");
    }

    // Recommend against a query embedded near the space-opera topic.
    let query_embedding = [8.5, 1.2, 0.0, 0.0, 0.0, 0.0, 0.3, 0.1];
    let scorer = Scorer::new(Weights::default())?;
    let ranked = scorer.recommend("galactic empires", &query_embedding, &books, 3);

    println!("query: galactic empires");
    for r in &ranked {
        println!(
            "  {} score={:.3} (sim={:.3} rating={:.2} novelty={:.2}) shared={:?}",
            r.book_id, r.score, r.similarity, r.normalized_rating, r.novelty, r.shared_keywords
        );
    }

    // And the nearest neighbors of one title.
    let similar = similar_books(&books, "space-opera-0", 3);
    for s in &similar {
        println!("  like space-opera-0: {} (sim={:.3})", s.book_id, s.similarity);
    }

    Ok(())
}
