/*!
# adscout API documentation

This page describes the API endpoints available on adscout.

## Interests

Endpoint: `/fb/interests`

Example: `/fb/interests?q=dota&limit=5`

Searches the advertising interest taxonomy of the configured ad account. Only
interest categories are returned: behaviors and demographics that the upstream
search also matches are dropped. If nothing usable is left, a short list of
alternative keywords is returned instead.

This endpoint accepts GET requests and takes parameters as query string values
and headers.

### Query Parameters

- `q` - The text to search for. Required. A missing, empty, or whitespace-only
  value is rejected with a 400.
- `limit` - The number of upstream results to request. Optional. Missing,
  unparsable, zero, and negative values use the configured default (10).
  Values above the configured maximum (100) are clamped to it.

### Headers

- `Authorization` - `Bearer <secret>`. Required only if the deployment has a
  shared secret configured. Checked before anything else.

### Response

With at least one interest:

```json
{
  "query": "dota",
  "count": 1,
  "items": [
    {
      "id": "1",
      "name": "Dota 2",
      "path": "Interests > Games > MOBA",
      "size": "1M–2M"
    }
  ]
}
```

- `path` - The taxonomy breadcrumb, joined with ` > `.
- `size` - The estimated audience as a range such as `1K–5K`, `1M–2M`, or
  `2.5B–3B`. `—` when the upstream has no estimate.

With no interests:

```json
{
  "query": "football",
  "count": 0,
  "items": [],
  "suggestions": ["video games", "gamers", "online games", "videojuegos"]
}
```

`suggestions` always holds between one and four distinct keywords, and is only
present when `count` is zero.

### Response Status Codes

- 200 OK - Interests or suggestions provided normally.
- 400 - `{"error": "Missing parameter 'q'"}`, or
  `{"error": "Bad Request", "details": <upstream error>}` when the upstream API
  rejected the search.
- 401 - `{"error": "Unauthorized"}`.
- 500 - `{"error": "Server missing environment variables"}` when upstream
  credentials are not configured, or
  `{"error": "Internal Server Error", "details": <message>}` when the upstream
  API could not be reached or answered with something unusable.

## Health

Endpoint: `/health`

Always answers `{"status": "online", "timestamp": "<RFC 3339 time>"}`.
*/
