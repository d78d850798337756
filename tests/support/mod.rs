pub mod mock_wiki;
